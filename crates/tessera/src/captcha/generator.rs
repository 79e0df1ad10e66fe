//! Captcha image generation.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result, anyhow};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use mosaic_common::constants::captcha::{ALPHABET, TEXT_LEN, TEXT_ORIGIN, TEXT_RGB};
use rand::Rng;

use super::temp::{prune_temp_dir, temp_filename};
use crate::config::AppConfig;
use crate::hashing::SaltedHasher;

/// A captcha written to disk
#[derive(Debug, Clone)]
pub struct GeneratedCaptcha {
    /// Salted hash of the letters
    pub hash: String,
    /// Image file name inside the temp dir
    pub filename: String,
}

/// Draws the captcha text onto a copy of the background
pub trait TextPainter: Send + Sync {
    fn paint(&self, canvas: &mut RgbImage, text: &str);
}

/// Paints text with a TrueType font in the captcha color
pub struct FontPainter {
    font: FontVec,
    size: f32,
}

impl FontPainter {
    pub fn new(font: FontVec, size: f32) -> Self {
        Self { font, size }
    }
}

impl TextPainter for FontPainter {
    fn paint(&self, canvas: &mut RgbImage, text: &str) {
        let (x, y) = TEXT_ORIGIN;
        draw_text_mut(canvas, Rgb(TEXT_RGB), x, y, PxScale::from(self.size), &self.font, text);
    }
}

/// CAPTCHA generator service
pub struct CaptchaGenerator {
    background: RgbImage,
    painter: Box<dyn TextPainter>,
    temp_dir: PathBuf,
    max_age: Duration,
    hasher: SaltedHasher,
}

impl CaptchaGenerator {
    /// Build a generator writing into `temp_dir`, creating it if needed
    pub fn new(
        background: RgbImage,
        painter: impl TextPainter + 'static,
        temp_dir: PathBuf,
        max_age: Duration,
        hasher: SaltedHasher,
    ) -> Result<Self> {
        std::fs::create_dir_all(&temp_dir)
            .with_context(|| format!("Failed to create captcha temp dir {}", temp_dir.display()))?;

        Ok(Self {
            background,
            painter: Box::new(painter),
            temp_dir,
            max_age,
            hasher,
        })
    }

    /// Load the background image and font named in the configuration
    pub fn load(config: &AppConfig, hasher: SaltedHasher) -> Result<Self> {
        let settings = &config.captcha;
        let static_root = Path::new(&config.static_root);

        let background_path = static_root.join(&settings.background_path);
        let background = image::open(&background_path)
            .with_context(|| format!("Failed to open captcha background {}", background_path.display()))?
            .to_rgb8();

        let font_path = static_root.join(&settings.font_path);
        let font_data = std::fs::read(&font_path)
            .with_context(|| format!("Failed to read captcha font {}", font_path.display()))?;
        let font = FontVec::try_from_vec(font_data)
            .map_err(|e| anyhow!("Invalid captcha font {}: {}", font_path.display(), e))?;

        Self::new(
            background,
            FontPainter::new(font, settings.font_size),
            Path::new(&config.media_root).join(&settings.temp_path),
            Duration::from_secs(settings.max_age_secs),
            hasher,
        )
    }

    /// Generate a captcha for `client`, pruning stale temp images first
    pub fn generate(&self, client: IpAddr) -> Result<GeneratedCaptcha> {
        let text = random_text(&mut rand::rng());
        self.generate_text(client, &text)
    }

    fn generate_text(&self, client: IpAddr, text: &str) -> Result<GeneratedCaptcha> {
        let hash = self.hasher.hash(text);
        let mut image = self.background.clone();
        self.painter.paint(&mut image, text);

        prune_temp_dir(&self.temp_dir, self.max_age, SystemTime::now())
            .with_context(|| format!("Failed to prune {}", self.temp_dir.display()))?;

        let filename = temp_filename(client, chrono::Local::now().naive_local());
        let path = self.temp_dir.join(&filename);
        image
            .save_with_format(&path, ImageFormat::Jpeg)
            .with_context(|| format!("Failed to write captcha image {}", path.display()))?;

        tracing::debug!(
            client = %client,
            filename = %filename,
            "Generated CAPTCHA image"
        );

        Ok(GeneratedCaptcha { hash, filename })
    }

    /// Check a typed answer against a handed-out hash (case-insensitive)
    pub fn verify(&self, answer: &str, hash: &str) -> bool {
        self.hasher.verify(&normalize_answer(answer), hash)
    }
}

/// Five letters from the captcha alphabet
pub fn random_text(rng: &mut impl Rng) -> String {
    (0..TEXT_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

fn normalize_answer(answer: &str) -> String {
    answer.trim().to_ascii_uppercase()
}
