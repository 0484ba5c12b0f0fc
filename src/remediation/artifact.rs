// SAA configuration artifact

use crate::constants::{SAA_ARTIFACT_PREFIX, SAA_ARTIFACT_SUFFIX};
use std::io::{self, Write};
use std::path::Path;
use tempfile::TempPath;

/// Render the BMC configuration that installs a certificate/key pair
///
/// The paths are written as-is (XML-escaped); the vendor tool opens the files
/// itself.
pub fn render_config(cert_path: &Path, key_path: &Path) -> String {
    format!(
        r#"<?xml version="1.0"?>
<BmcCfg>
  <OemCfg Action="Change">
    <Certification Action="Change">
      <Configuration>
        <CertFile>{}</CertFile>
        <PrivKeyFile>{}</PrivKeyFile>
      </Configuration>
    </Certification>
  </OemCfg>
</BmcCfg>
"#,
        escape(&cert_path.display().to_string()),
        escape(&key_path.display().to_string()),
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Temporary configuration file handed to the vendor tool
///
/// Removed when dropped, whichever way the push ends. A tool that deletes the
/// file itself is tolerated.
#[derive(Debug)]
pub struct ConfigArtifact {
    path: TempPath,
}

impl ConfigArtifact {
    /// Write `contents` to a fresh file in the system temp directory
    pub fn create(contents: &str) -> io::Result<Self> {
        Self::create_in(&std::env::temp_dir(), contents)
    }

    /// Write `contents` to a fresh file in `dir`
    pub fn create_in(dir: &Path, contents: &str) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(SAA_ARTIFACT_PREFIX)
            .suffix(SAA_ARTIFACT_SUFFIX)
            .tempfile_in(dir)?;

        file.write_all(contents.as_bytes())?;
        file.flush()?;

        // Close our handle before the tool opens it
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
