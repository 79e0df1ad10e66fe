//! Temp image naming and pruning.

use std::io::ErrorKind;
use std::net::IpAddr;
use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::NaiveDateTime;

/// File name for a captcha image requested by `client` at `now`
pub fn temp_filename(client: IpAddr, now: NaiveDateTime) -> String {
    // IPv6 colons are not welcome in file names or URLs
    let client = client.to_string().replace(':', "-");
    format!("{}_{}.jpg", client, now.format("%Y-%m-%dT%H-%M-%S%.6f"))
}

/// Delete files in `dir` older than `max_age`, or dated in the future.
///
/// Files removed concurrently by another request are ignored. Returns the
/// number of files this call removed.
pub fn prune_temp_dir(dir: &Path, max_age: Duration, now: SystemTime) -> std::io::Result<usize> {
    let mut removed = 0;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        if !metadata.is_file() {
            continue;
        }

        let expired = match now.duration_since(metadata.modified()?) {
            Ok(age) => age > max_age,
            // modified after `now`: clock skew
            Err(_) => true,
        };
        if !expired {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }

    if removed > 0 {
        tracing::debug!(dir = ?dir, removed, "Pruned captcha temp files");
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs::File;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn touch(dir: &Path, name: &str, modified: SystemTime) {
        let file = File::create(dir.join(name)).unwrap();
        file.set_modified(modified).unwrap();
    }

    #[test]
    fn test_temp_filename() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_micro_opt(14, 5, 6, 789)
            .unwrap();

        assert_eq!(
            temp_filename(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)), now),
            "10.0.0.7_2024-03-09T14-05-06.000789.jpg"
        );
        assert_eq!(
            temp_filename(IpAddr::V6(Ipv6Addr::LOCALHOST), now),
            "--1_2024-03-09T14-05-06.000789.jpg"
        );
    }

    #[test]
    fn test_prune_by_age() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let max_age = Duration::from_secs(180);

        touch(dir.path(), "fresh.jpg", now - Duration::from_secs(10));
        touch(dir.path(), "recent.jpg", now - Duration::from_secs(179));
        touch(dir.path(), "old.jpg", now - Duration::from_secs(181));
        touch(dir.path(), "future.jpg", now + Duration::from_secs(60));
        std::fs::create_dir(dir.path().join("subdir")).unwrap();

        let removed = prune_temp_dir(dir.path(), max_age, now).unwrap();
        assert_eq!(removed, 2);

        let mut left: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(left, vec!["fresh.jpg", "recent.jpg", "subdir"]);
    }

    #[test]
    fn test_prune_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(prune_temp_dir(&missing, Duration::from_secs(1), SystemTime::now()).is_err());
    }
}
