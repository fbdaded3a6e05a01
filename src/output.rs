use std::fs;
use std::path::{Path, PathBuf};

use crate::error::OutputError;
use crate::okh::OkhRecord;
use crate::sanitize::clean_name;

const FILE_PREFIX: &str = "okh-appropedia_org-";

/// Manifest path for a project: `<dir>/okh-appropedia_org-<clean title>.toml`.
pub fn manifest_path(dir: &Path, title: &str) -> PathBuf {
    dir.join(format!("{}{}.toml", FILE_PREFIX, clean_name(title)))
}

pub fn to_toml(record: &OkhRecord) -> Result<String, OutputError> {
    Ok(toml::to_string(record)?)
}

pub fn write_manifest(dir: &Path, title: &str, record: &OkhRecord) -> Result<PathBuf, OutputError> {
    let path = manifest_path(dir, title);
    let text = to_toml(record)?;
    fs::write(&path, text).map_err(|source| OutputError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::okh::record::{Licensor, ReadinessLevel};

    fn full_record() -> OkhRecord {
        let mut r = OkhRecord::new("Widget", "https://www.appropedia.org/Widget");
        r.licensor = Some(Licensor::Many(vec!["Jane Doe".into(), "John Roe".into()]));
        r.image = Some("https://www.appropedia.org/w/images/1/1a/Widget.jpg".into());
        r.function = Some("gadget - a small widget".into());
        r.documentation_language = Some("en".into());
        r.technology_readiness_level = Some(ReadinessLevel::Otrl5);
        r
    }

    #[test]
    fn round_trip_keeps_licensor_sequence() {
        let r = full_record();
        let back: OkhRecord = toml::from_str(&to_toml(&r).unwrap()).unwrap();
        assert_eq!(back, r);
        assert!(matches!(back.licensor, Some(Licensor::Many(ref v)) if v.len() == 2));
    }

    #[test]
    fn round_trip_keeps_licensor_scalar() {
        let mut r = OkhRecord::new("Widget", "https://www.appropedia.org/Widget");
        r.licensor = Some(Licensor::One("Jane Doe".into()));
        let text = to_toml(&r).unwrap();
        assert!(text.contains("licensor = \"Jane Doe\""));
        let back: OkhRecord = toml::from_str(&text).unwrap();
        assert_eq!(back.licensor, Some(Licensor::One("Jane Doe".into())));
    }

    #[test]
    fn absent_fields_are_not_written() {
        let text = to_toml(&OkhRecord::new("W", "https://x.org/W")).unwrap();
        assert!(text.contains("license = \"CC-BY-SA 4.0\""));
        assert!(text.contains("okhv = \"2.0\""));
        assert!(!text.contains("licensor"));
        assert!(!text.contains("technology-readiness-level"));
    }

    #[test]
    fn okh_key_names() {
        let text = to_toml(&full_record()).unwrap();
        assert!(text.contains("documentation-language = \"en\""));
        assert!(text.contains("technology-readiness-level = \"OTRL-5\""));
    }

    #[test]
    fn writes_sanitized_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), "../Widget v2", &full_record()).unwrap();
        assert_eq!(path, dir.path().join("okh-appropedia_org-___Widget_v2.toml"));
        let back: OkhRecord = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, full_record());
    }
}
