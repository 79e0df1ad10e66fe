//! Named block rendering.
//!
//! A template is evaluated once in full, which runs its `extends` chain and
//! fills the engine's block table: every block declared anywhere in the
//! template (also inside `if`/`for` bodies) plus the blocks its ancestors
//! declare, the most derived definition first. A block is then rendered
//! from that table. An absent block is reported as [`BlockError::NotFound`],
//! never as an empty string, so callers can tell "missing" from "rendered to
//! nothing". A block that fails to render counts as absent; failing to
//! evaluate the template itself (bad parent, broken include) is an error.

use minijinja::{ErrorKind, State, Template};
use mosaic_common::MosaicError;
use serde::Serialize;
use thiserror::Error;

use crate::template::{TemplateEngine, TemplateError};

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("block '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl From<BlockError> for MosaicError {
    fn from(err: BlockError) -> Self {
        match err {
            BlockError::NotFound(name) => MosaicError::BlockNotFound(name),
            BlockError::Template(e) => e.into(),
        }
    }
}

/// Render `block` from a template state produced by `eval_to_state`.
///
/// After a failed block the state must not be reused.
pub fn render_state_block(state: &mut State<'_, '_>, block: &str) -> Result<String, BlockError> {
    match state.render_block(block) {
        Ok(rendered) => Ok(rendered),
        Err(e) if e.kind() == ErrorKind::UnknownBlock => Err(BlockError::NotFound(block.to_string())),
        Err(e) => {
            tracing::debug!(block, error = %e, "Block failed to render, treating as absent");
            Err(BlockError::NotFound(block.to_string()))
        }
    }
}

/// Evaluate `template` with `ctx`, then render just `block`
pub fn render_template_block<C: Serialize>(
    template: &Template<'_, '_>,
    block: &str,
    ctx: C,
) -> Result<String, BlockError> {
    let mut state = template.eval_to_state(ctx).map_err(TemplateError::from)?;
    let rendered = render_state_block(&mut state, block)?;

    tracing::debug!(template = template.name(), block, "Rendered block");
    Ok(rendered)
}

/// Resolve the first existing template in `names` and render `block` of it
pub fn render_block_to_string<S: AsRef<str>, C: Serialize>(
    engine: &TemplateEngine,
    names: &[S],
    block: &str,
    ctx: C,
) -> Result<String, BlockError> {
    let template = engine.select_template(names)?;
    render_template_block(&template, block, ctx)
}
