use crate::document::record::{Corpus, JobRecord, RawJobRecord};
use crate::error::{StoreError, StoreResult};
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Header row of the persisted snapshot, in column order.
pub const SNAPSHOT_COLUMNS: [&str; 8] = [
    "Title",
    "Company",
    "Location",
    "Description",
    "DatePosted",
    "SkillLevel",
    "Link",
    "Source",
];

#[derive(Debug, Deserialize)]
struct SnapshotRow {
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Company", default)]
    company: Option<String>,
    #[serde(rename = "Location", default)]
    location: Option<String>,
    #[serde(rename = "Description", default)]
    description: Option<String>,
    #[serde(rename = "DatePosted", default)]
    date_posted: Option<String>,
    #[serde(rename = "SkillLevel", default)]
    skill_level: Option<String>,
    #[serde(rename = "Link", default)]
    link: Option<String>,
    #[serde(rename = "Source", default)]
    source: Option<String>,
    #[serde(rename = "Skills", default)]
    skills: Option<String>,
}

impl From<SnapshotRow> for RawJobRecord {
    fn from(row: SnapshotRow) -> Self {
        RawJobRecord {
            title: row.title,
            company: row.company,
            location: row.location,
            description: row.description,
            date_posted: row.date_posted,
            skill_level: row.skill_level,
            link: row.link,
            source: row.source,
            skills: row.skills,
        }
    }
}

/// Reads the snapshot at `path`. Returns `Ok(None)` when no snapshot exists.
///
/// Columns missing from the header are filled with the sentinel, unknown
/// columns are ignored and malformed rows are skipped.
pub fn read_snapshot(path: &Path) -> StoreResult<Option<Corpus>> {
    if !path.exists() {
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| StoreError::SnapshotRead {
            path: path.to_path_buf(),
            source,
        })?;

    let mut records = Vec::new();
    for (line, row) in reader.deserialize::<SnapshotRow>().enumerate() {
        match row {
            Ok(row) => records.push(JobRecord::from(RawJobRecord::from(row))),
            Err(e) => warn!("Skipping malformed snapshot row {} in {}: {}", line + 2, path.display(), e),
        }
    }

    debug!("Read {} records from {}", records.len(), path.display());
    Ok(Some(Corpus::new(records)))
}

/// Writes the corpus as a snapshot, header row first, creating parent directories.
pub fn write_snapshot(path: &Path, corpus: &Corpus) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let write_err = |source: csv::Error| StoreError::SnapshotWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
    writer.write_record(SNAPSHOT_COLUMNS).map_err(write_err)?;
    for record in corpus.iter() {
        writer
            .write_record([
                &record.title,
                &record.company,
                &record.location,
                &record.description,
                &record.date_posted,
                &record.skill_level,
                &record.link,
                &record.source,
            ])
            .map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| write_err(csv::Error::from(e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::record::MISSING;
    use tempfile::TempDir;

    fn posting(title: &str, company: &str, link: &str) -> JobRecord {
        JobRecord::from(RawJobRecord {
            title: Some(title.to_string()),
            company: Some(company.to_string()),
            location: Some("Pune, India".to_string()),
            description: Some(title.to_string()),
            date_posted: Some("2 days ago".to_string()),
            skill_level: Some("Mid".to_string()),
            link: Some(link.to_string()),
            source: Some("Indeed".to_string()),
            skills: None,
        })
    }

    #[test]
    fn missing_snapshot_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_snapshot(&dir.path().join("jobs.csv")).unwrap().is_none());
    }

    #[test]
    fn written_snapshot_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("jobs.csv");
        let corpus = Corpus::new(vec![
            posting("Data Scientist", "Acme, Inc.", "/jobs/1"),
            posting("ML Engineer", "Globex", "https://globex.example/ml"),
        ]);

        write_snapshot(&path, &corpus).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Title,Company,Location,Description,DatePosted,SkillLevel,Link,Source"));

        let loaded = read_snapshot(&path).unwrap().unwrap();
        assert_eq!(loaded, corpus);
    }

    #[test]
    fn empty_corpus_still_writes_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.csv");
        write_snapshot(&path, &Corpus::default()).unwrap();

        let loaded = read_snapshot(&path).unwrap().unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn missing_columns_are_filled_and_skills_column_is_used() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.csv");
        fs::write(
            &path,
            "Title,Company,Skills\nBackend Engineer,Initech,Python Flask SQL\nFrontend Developer,,\n",
        )
        .unwrap();

        let corpus = read_snapshot(&path).unwrap().unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus[0].location, MISSING);
        assert_eq!(corpus[0].skills_text(), "python flask sql");
        assert_eq!(corpus[1].company, MISSING);
        assert_eq!(corpus[1].skills_text(), "frontend developer n/a");
    }
}
