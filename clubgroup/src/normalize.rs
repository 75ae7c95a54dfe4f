//! Text normalization for search tokens.
//!
//! A [`Normalizer`] folds diacritics and case so that a group named
//! "Đội Tình nguyện" can be found by typing "doi tinh nguyen".

use std::fmt::Debug;

/// Error raised when a text cannot be normalized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DerivationError {
    /// The input contains characters that cannot appear in a search token
    #[error("Malformed input at char {position}: {reason}")]
    Malformed { position: usize, reason: String },

    /// Normalizer-specific failure
    #[error("Normalization failed: {0}")]
    Other(String),
}

/// Pure text-to-token function: diacritic folding plus case folding
pub trait Normalizer: Send + Sync + Debug {
    /// Normalize `text` into its folded form
    fn normalize(&self, text: &str) -> Result<String, DerivationError>;
}

/// Default normalizer folding Vietnamese (and other Latin combining) diacritics
#[derive(Debug, Clone, Copy, Default)]
pub struct VietnameseFolding;

impl VietnameseFolding {
    pub fn new() -> Self {
        Self
    }
}

impl Normalizer for VietnameseFolding {
    fn normalize(&self, text: &str) -> Result<String, DerivationError> {
        let mut folded = String::with_capacity(text.len());

        for (position, c) in text.chars().enumerate() {
            if c.is_control() && !matches!(c, '\t' | '\n' | '\r') {
                return Err(DerivationError::Malformed {
                    position,
                    reason: format!("control character U+{:04X}", c as u32),
                });
            }
            for lower in c.to_lowercase() {
                if let Some(base) = fold_char(lower) {
                    folded.push(base);
                }
            }
        }

        Ok(folded)
    }
}

/// Map a lowercase character to its unaccented base, `None` for bare combining marks
fn fold_char(c: char) -> Option<char> {
    let base = match c {
        'à' | 'á' | 'ạ' | 'ả' | 'ã' | 'â' | 'ầ' | 'ấ' | 'ậ' | 'ẩ' | 'ẫ' | 'ă' | 'ằ' | 'ắ'
        | 'ặ' | 'ẳ' | 'ẵ' | 'ä' | 'å' => 'a',
        'è' | 'é' | 'ẹ' | 'ẻ' | 'ẽ' | 'ê' | 'ề' | 'ế' | 'ệ' | 'ể' | 'ễ' | 'ë' => 'e',
        'ì' | 'í' | 'ị' | 'ỉ' | 'ĩ' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ọ' | 'ỏ' | 'õ' | 'ô' | 'ồ' | 'ố' | 'ộ' | 'ổ' | 'ỗ' | 'ơ' | 'ờ' | 'ớ'
        | 'ợ' | 'ở' | 'ỡ' | 'ö' => 'o',
        'ù' | 'ú' | 'ụ' | 'ủ' | 'ũ' | 'ư' | 'ừ' | 'ứ' | 'ự' | 'ử' | 'ữ' | 'û' | 'ü' => 'u',
        'ỳ' | 'ý' | 'ỵ' | 'ỷ' | 'ỹ' | 'ÿ' => 'y',
        'đ' => 'd',
        'ç' => 'c',
        'ñ' => 'n',
        // Combining diacritical marks left over from decomposed input
        '\u{0300}'..='\u{036F}' => return None,
        other => other,
    };
    Some(base)
}
