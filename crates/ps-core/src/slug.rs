//! Event name to URL slug conversion.
//!
//! Mirrors what guests see in the share link: lowercase ASCII words joined
//! by single dashes ("Casamento Ana & Bruno" -> "casamento-ana-bruno").

/// Folds the accented characters that show up in real event names.
fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => c,
    }
}

/// Derives the slug for an event display name. Returns an empty string when
/// the name contains nothing usable, which callers must reject.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.trim().to_lowercase().chars().map(fold_char) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
        // Everything else (punctuation, emoji) is dropped.
    }
    out
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn basic_names() {
        assert_eq!(slugify("Festa Vicente"), "festa-vicente");
        assert_eq!(slugify("Casamento Ana & Bruno"), "casamento-ana-bruno");
    }

    #[test]
    fn accents_fold_to_ascii() {
        assert_eq!(slugify("São João"), "sao-joao");
        assert_eq!(slugify("Formatura Júlia"), "formatura-julia");
    }

    #[test]
    fn dashes_collapse_and_trim() {
        assert_eq!(slugify("  aniversário --  15 anos  "), "aniversario-15-anos");
    }

    #[test]
    fn unusable_names_yield_empty() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("   "), "");
    }
}
