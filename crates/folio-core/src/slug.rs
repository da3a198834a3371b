//! URL slug generation.

/// Turns arbitrary text into a lowercase, hyphen-separated URL token.
///
/// Common Latin accents are folded to ASCII first; anything else outside
/// `[a-z0-9]` is dropped. Runs of whitespace, underscores and hyphens become a
/// single `-`, and the result never starts or ends with `-`. An input with no
/// usable characters yields an empty string.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut separator = false;
    let mut buf = [0u8; 4];

    for raw in text.chars() {
        let piece: &str = match fold_latin(raw) {
            Some(folded) => folded,
            None => raw.encode_utf8(&mut buf),
        };

        for ch in piece.chars().flat_map(char::to_lowercase) {
            match ch {
                'a'..='z' | '0'..='9' => {
                    if separator && !slug.is_empty() {
                        slug.push('-');
                    }
                    separator = false;
                    slug.push(ch);
                }
                '-' | '_' => separator = true,
                c if c.is_whitespace() => separator = true,
                _ => {}
            }
        }
    }

    slug
}

/// Checks a slug against `^[a-z0-9-]+$`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

fn fold_latin(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' => "a",
        'æ' | 'Æ' => "ae",
        'ç' | 'ć' | 'č' | 'Ç' | 'Ć' | 'Č' => "c",
        'ď' | 'đ' | 'Ď' | 'Đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ě' | 'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ě' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' => "i",
        'ł' | 'Ł' => "l",
        'ñ' | 'ń' | 'ň' | 'Ñ' | 'Ń' | 'Ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' => "o",
        'œ' | 'Œ' => "oe",
        'ř' | 'Ř' => "r",
        'ś' | 'š' | 'Ś' | 'Š' => "s",
        'ß' => "ss",
        'ť' | 'Ť' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        'ź' | 'ż' | 'ž' | 'Ź' | 'Ż' | 'Ž' => "z",
        _ => return None,
    };
    Some(folded)
}
