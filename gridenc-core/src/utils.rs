//! Formatting and path helpers shared by the core and the CLI.

use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// Formats bytes with binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.1} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Formats seconds as HH:MM:SS. Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }
    let total = seconds as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Extracts the filename component of a path, failing on paths like `/` or `..`.
pub fn get_filename_safe(path: &Path) -> CoreResult<String> {
    Ok(path
        .file_name()
        .ok_or_else(|| {
            CoreError::PathError(format!("Failed to get filename for {}", path.display()))
        })?
        .to_string_lossy()
        .into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn formats_bytes_across_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GiB");
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(3725.0), "01:02:05");
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
    }

    #[test]
    fn filename_extraction() {
        assert_eq!(
            get_filename_safe(&PathBuf::from("/videos/sample.mp4")).unwrap(),
            "sample.mp4"
        );
        assert!(get_filename_safe(&PathBuf::from("/")).is_err());
    }
}
