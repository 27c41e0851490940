//! services/api/src/bin/openapi.rs
//!
//! Dumps the wizard API's OpenAPI document.
//!
//! Usage: `openapi [PATH]`. Writes `openapi.json` by default; `-` prints the
//! document to stdout so it can be piped into client generators.

use api_lib::web::rest::ApiDoc;
use std::io::Write;
use std::path::PathBuf;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

#[derive(Debug, PartialEq)]
enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    fn from_arg(arg: Option<String>) -> Self {
        match arg.as_deref() {
            Some("-") => Output::Stdout,
            Some(path) => Output::File(PathBuf::from(path)),
            None => Output::File(PathBuf::from(DEFAULT_OUTPUT)),
        }
    }
}

/// The API document, stamped with this crate's version.
fn render_document() -> Result<String, serde_json::Error> {
    let mut doc = ApiDoc::openapi();
    doc.info.title = "Course Wizard API".to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc.to_pretty_json()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let document = render_document()?;
    match Output::from_arg(std::env::args().nth(1)) {
        Output::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
        Output::File(path) => {
            std::fs::write(&path, document)?;
            eprintln!("OpenAPI document written to {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_output_from_argument() {
        assert_eq!(Output::from_arg(Some("-".into())), Output::Stdout);
        assert_eq!(
            Output::from_arg(Some("docs/api.json".into())),
            Output::File(PathBuf::from("docs/api.json"))
        );
        assert_eq!(
            Output::from_arg(None),
            Output::File(PathBuf::from(DEFAULT_OUTPUT))
        );
    }

    #[test]
    fn document_lists_every_wizard_route() {
        let document: serde_json::Value =
            serde_json::from_str(&render_document().unwrap()).unwrap();
        assert_eq!(document["info"]["version"], env!("CARGO_PKG_VERSION"));
        let paths = document["paths"].as_object().unwrap();
        for route in [
            "/wizards",
            "/wizards/{wizard_id}",
            "/wizards/{wizard_id}/actions",
            "/wizards/{wizard_id}/publish",
        ] {
            assert!(paths.contains_key(route), "missing {route}");
        }
    }
}
