//! Derived outputs built from a parsed project: decoded texture images,
//! a JSON manifest and a plain-text asset report.

pub mod manifest;
pub mod report;
pub mod texture;

pub use manifest::{build_manifest, Manifest};
pub use report::{asset_report, object_tree};
pub use texture::{export_textures, texture_to_image, ExportFormat, TextureExportOptions};

const MAX_FILENAME_LEN: usize = 100;

/// Turn an asset name into something every file system accepts.
///
/// Reserved characters and spaces become `_`, common accented Latin letters
/// fold to ASCII and anything else outside printable ASCII is dropped.
pub fn sanitize_filename(name: &str) -> String {
    let mut safe: String = name
        .chars()
        .filter_map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | ' ' => Some('_'),
            'à' | 'á' | 'â' | 'ä' | 'å' => Some('a'),
            'À' | 'Á' | 'Â' | 'Ä' | 'Å' => Some('A'),
            'è' | 'é' | 'ê' | 'ë' => Some('e'),
            'ì' | 'í' | 'î' | 'ï' => Some('i'),
            'ò' | 'ó' | 'ô' | 'ö' => Some('o'),
            'Ö' => Some('O'),
            'ù' | 'ú' | 'û' | 'ü' => Some('u'),
            c if (' '..='~').contains(&c) => Some(c),
            _ => None,
        })
        .collect();

    let trimmed = safe.trim_end_matches(['.', ' ']).len();
    safe.truncate(trimmed);

    if safe.is_empty() {
        return "unnamed".to_string();
    }
    // Only ASCII is left, so byte and char positions agree.
    safe.truncate(MAX_FILENAME_LEN);
    safe
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_characters_and_spaces() {
        assert_eq!(sanitize_filename("a<b>c:d\"e/f\\g|h?i*j k"), "a_b_c_d_e_f_g_h_i_j_k");
    }

    #[test]
    fn test_accents_fold_and_unicode_drops() {
        assert_eq!(sanitize_filename("Fläktövåg"), "Flaktovag");
        assert_eq!(sanitize_filename("Ärende"), "Arende");
        assert_eq!(sanitize_filename("tank€"), "tank");
    }

    #[test]
    fn test_trailing_dots_and_empty() {
        assert_eq!(sanitize_filename("name..."), "name");
        assert_eq!(sanitize_filename("..."), "unnamed");
        assert_eq!(sanitize_filename(""), "unnamed");
        assert_eq!(sanitize_filename("€€"), "unnamed");
    }

    #[test]
    fn test_truncates_long_names() {
        let long = "x".repeat(250);
        assert_eq!(sanitize_filename(&long).len(), 100);
    }
}
