//! Matroska chapter document rendering

use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::chapters::timeline::ChapterTiming;
use crate::domain::model::{Atom, Edition};
use crate::error::{ChapterError, ChapterResult};

/// Source of chapter and edition UIDs.
///
/// Seeded from the clock in production so repeated runs do not collide;
/// the value never feeds into ordering or timestamps.
#[derive(Debug, Clone)]
pub struct UidGenerator {
    next: u64,
}

impl UidGenerator {
    pub fn from_clock() -> Self {
        let micros = Utc::now().timestamp_micros();
        Self::seeded(u64::try_from(micros).unwrap_or_default())
    }

    pub fn seeded(seed: u64) -> Self {
        Self { next: seed }
    }

    pub fn next_uid(&mut self) -> u64 {
        let uid = self.next;
        self.next = self.next.wrapping_add(1);
        uid
    }
}

/// Rendered chapter file contents
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterDocument {
    edition: Edition,
    atoms: Vec<Atom>,
    language: String,
    country: String,
}

impl ChapterDocument {
    pub fn edition(&self) -> &Edition {
        &self.edition
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<!-- <!DOCTYPE Chapters SYSTEM \"matroskachapters.dtd\"> -->\n");
        xml.push_str("<Chapters>\n");
        xml.push_str("  <EditionEntry>\n");
        xml.push_str(&format!(
            "    <EditionFlagDefault>{}</EditionFlagDefault>\n",
            flag(self.edition.default)
        ));
        xml.push_str(&format!(
            "    <EditionFlagOrdered>{}</EditionFlagOrdered>\n",
            flag(self.edition.ordered)
        ));
        xml.push_str(&format!("    <EditionUID>{}</EditionUID>\n", self.edition.uid));
        xml.push_str("    <EditionFlagHidden>0</EditionFlagHidden>\n");

        for atom in &self.atoms {
            xml.push_str("    <ChapterAtom>\n");
            xml.push_str(&format!("      <ChapterUID>{}</ChapterUID>\n", atom.uid));
            xml.push_str(&format!(
                "      <ChapterTimeStart>{}</ChapterTimeStart>\n",
                escape_xml(&atom.start)
            ));
            xml.push_str(&format!(
                "      <ChapterTimeEnd>{}</ChapterTimeEnd>\n",
                escape_xml(&atom.end)
            ));
            if let Some(segment_uid) = &atom.segment_uid {
                xml.push_str(&format!(
                    "      <ChapterSegmentUID format=\"hex\">{}</ChapterSegmentUID>\n",
                    escape_xml(segment_uid)
                ));
            }
            xml.push_str(&format!(
                "      <ChapterFlagHidden>{}</ChapterFlagHidden>\n",
                flag(atom.hidden)
            ));
            xml.push_str(&format!(
                "      <ChapterFlagEnabled>{}</ChapterFlagEnabled>\n",
                flag(atom.enabled)
            ));
            xml.push_str("      <ChapterDisplay>\n");
            xml.push_str(&format!(
                "        <ChapterString>{}</ChapterString>\n",
                escape_xml(&atom.name)
            ));
            xml.push_str(&format!(
                "        <ChapterCountry>{}</ChapterCountry>\n",
                escape_xml(&self.country)
            ));
            xml.push_str(&format!(
                "        <ChapterLanguage>{}</ChapterLanguage>\n",
                escape_xml(&self.language)
            ));
            xml.push_str("      </ChapterDisplay>\n");
            xml.push_str("    </ChapterAtom>\n");
        }

        xml.push_str("  </EditionEntry>\n");
        xml.push_str("</Chapters>\n");
        xml
    }

    pub fn write_to(&self, path: &Path) -> ChapterResult<()> {
        fs::write(path, self.to_xml())?;
        info!(path = %path.display(), atoms = self.atoms.len(), "Wrote chapter file");
        Ok(())
    }
}

/// Turns reconstructed timings into a [`ChapterDocument`]
#[derive(Debug, Clone)]
pub struct ChapterDocumentBuilder {
    edition_default: bool,
    language: String,
    country: String,
    uid_seed: Option<u64>,
}

impl Default for ChapterDocumentBuilder {
    fn default() -> Self {
        Self {
            edition_default: true,
            language: "eng".to_string(),
            country: "us".to_string(),
            uid_seed: None,
        }
    }
}

impl ChapterDocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edition_default(mut self, default: bool) -> Self {
        self.edition_default = default;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Fix the UID sequence instead of seeding it from the clock
    pub fn uid_seed(mut self, seed: u64) -> Self {
        self.uid_seed = Some(seed);
        self
    }

    pub fn build(&self, timings: &[ChapterTiming]) -> ChapterResult<ChapterDocument> {
        if let Some(index) = timings.iter().position(|t| t.name.trim().is_empty()) {
            return Err(ChapterError::EmptyChapterName { index });
        }

        let mut uids = match self.uid_seed {
            Some(seed) => UidGenerator::seeded(seed),
            None => UidGenerator::from_clock(),
        };

        let edition = Edition {
            default: self.edition_default,
            ordered: timings.iter().any(|t| t.segment_uid.is_some()),
            uid: uids.next_uid(),
        };

        let atoms = timings
            .iter()
            .map(|timing| Atom {
                uid: uids.next_uid(),
                start: timing.start.clone(),
                end: timing.end.clone(),
                name: timing.name.clone(),
                hidden: false,
                enabled: true,
                segment_uid: timing.segment_uid.clone(),
            })
            .collect();

        Ok(ChapterDocument {
            edition,
            atoms,
            language: self.language.clone(),
            country: self.country.clone(),
        })
    }
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
