//! Stroke-code parsing.
//!
//! The raw input buffer carries the phonetic code, then a guide key, then an
//! auxiliary stroke code: `wo;pn` is the pinyin `wo` filtered by strokes
//! `p` (left-falling) and `n` (dot).
//!
//! Stroke alphabet:
//! - `h` horizontal, `s` vertical, `p` left-falling, `n` dot, `z` turning
//! - `d` is an alias of `n`
//! - `x` matches exactly one stroke of any type

use std::fmt;
use std::str::FromStr;

/// One stroke type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stroke {
    /// 横
    Horizontal,
    /// 竖
    Vertical,
    /// 撇
    LeftFalling,
    /// 点 / 捺
    Dot,
    /// 折
    Turning,
}

impl Stroke {
    /// Parse a user-typed stroke letter. `d` collapses to `Dot`.
    pub fn from_code(ch: char) -> Option<Self> {
        match ch {
            'h' => Some(Self::Horizontal),
            's' => Some(Self::Vertical),
            'p' => Some(Self::LeftFalling),
            'n' | 'd' => Some(Self::Dot),
            'z' => Some(Self::Turning),
            _ => None,
        }
    }

    /// The canonical letter as stored in stroke databases.
    pub fn code(self) -> char {
        match self {
            Self::Horizontal => 'h',
            Self::Vertical => 's',
            Self::LeftFalling => 'p',
            Self::Dot => 'n',
            Self::Turning => 'z',
        }
    }
}

/// One position of a stroke code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrokeSlot {
    Exact(Stroke),
    /// Matches any single stroke
    Any,
}

impl StrokeSlot {
    pub const WILDCARD: char = 'x';

    pub fn from_code(ch: char) -> Option<Self> {
        if ch == Self::WILDCARD {
            Some(Self::Any)
        } else {
            Stroke::from_code(ch).map(Self::Exact)
        }
    }

    /// Whether this slot accepts `symbol` from a stored variant.
    pub fn accepts(self, symbol: char) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(stroke) => stroke.code() == symbol,
        }
    }
}

/// Why a string is not a stroke code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrokeCodeError {
    Empty,
    InvalidSymbol { symbol: char, position: usize },
}

impl fmt::Display for StrokeCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty stroke code"),
            Self::InvalidSymbol { symbol, position } => write!(
                f,
                "invalid stroke symbol {:?} at position {} (expected one of h s p n d z x)",
                symbol, position
            ),
        }
    }
}

impl std::error::Error for StrokeCodeError {}

/// A normalized stroke code: aliases collapsed, wildcards marked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StrokeCode {
    slots: Vec<StrokeSlot>,
}

impl StrokeCode {
    /// Anchored prefix test against one stored variant.
    ///
    /// Every slot must be matched by one symbol of `variant`; symbols past
    /// the end of the code are ignored.
    pub fn is_prefix_of(&self, variant: &str) -> bool {
        let mut symbols = variant.chars();
        self.slots
            .iter()
            .all(|slot| symbols.next().is_some_and(|s| slot.accepts(s)))
    }
}

impl FromStr for StrokeCode {
    type Err = StrokeCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(StrokeCodeError::Empty);
        }
        let slots = s
            .chars()
            .enumerate()
            .map(|(position, symbol)| {
                StrokeSlot::from_code(symbol)
                    .ok_or(StrokeCodeError::InvalidSymbol { symbol, position })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { slots })
    }
}

impl fmt::Display for StrokeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in &self.slots {
            let ch = match slot {
                StrokeSlot::Any => StrokeSlot::WILDCARD,
                StrokeSlot::Exact(stroke) => stroke.code(),
            };
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}

/// Input split into phonetic code and stroke code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput<'a> {
    pub base_code: &'a str,
    pub stroke_code: StrokeCode,
}

/// Split `text` at the first occurrence of `guide_key`.
///
/// The guide key is matched literally. An empty guide key never matches.
pub fn split_at_guide<'a>(text: &'a str, guide_key: &str) -> Option<(&'a str, &'a str)> {
    if guide_key.is_empty() {
        return None;
    }
    let pos = text.find(guide_key)?;
    Some((&text[..pos], &text[pos + guide_key.len()..]))
}

/// Parse the raw input buffer.
///
/// Returns `None` (filter inactive) when the guide key is absent, nothing
/// precedes it, nothing follows it, or what follows is not a stroke code.
pub fn parse_input<'a>(input: &'a str, guide_key: &str) -> Option<ParsedInput<'a>> {
    let (base_code, suffix) = split_at_guide(input, guide_key)?;
    if base_code.is_empty() {
        return None;
    }
    let stroke_code = suffix.parse().ok()?;
    Some(ParsedInput {
        base_code,
        stroke_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> StrokeCode {
        s.parse().unwrap()
    }

    #[test]
    fn parse_basic() {
        let parsed = parse_input("wo;p", ";").unwrap();
        assert_eq!(parsed.base_code, "wo");
        assert_eq!(parsed.stroke_code, code("p"));
    }

    #[test]
    fn alias_collapses_to_dot() {
        assert_eq!(code("pdzd"), code("pnzn"));
        assert_eq!(code("d").to_string(), "n");
        assert_eq!(code("hxd").to_string(), "hxn");
    }

    #[test]
    fn parse_failures() {
        assert!(parse_input("wo", ";").is_none(), "no guide key");
        assert!(parse_input(";p", ";").is_none(), "empty base code");
        assert!(parse_input("wo;", ";").is_none(), "empty suffix");
        assert!(parse_input("wo;pa", ";").is_none(), "invalid letter");
        assert!(parse_input("wo;P", ";").is_none(), "uppercase");
        assert!(parse_input("wo;p;", ";").is_none(), "second guide key");
        assert!(parse_input("wo;p", "").is_none(), "empty guide key");
    }

    #[test]
    fn splits_at_first_guide_occurrence() {
        assert_eq!(split_at_guide("a;b;c", ";"), Some(("a", "b;c")));
        let parsed = parse_input("ni//hs", "//").unwrap();
        assert_eq!(parsed.base_code, "ni");
        assert_eq!(parsed.stroke_code, code("hs"));
    }

    #[test]
    fn guide_key_is_literal() {
        // regex metacharacters carry no meaning
        assert!(parse_input("woxp", ".").is_none());
        let parsed = parse_input("wo.p", ".").unwrap();
        assert_eq!(parsed.base_code, "wo");
        assert!(parse_input("wo[p", "[").is_some());
    }

    #[test]
    fn error_reports_position() {
        assert_eq!("".parse::<StrokeCode>(), Err(StrokeCodeError::Empty));
        assert_eq!(
            "hsq".parse::<StrokeCode>(),
            Err(StrokeCodeError::InvalidSymbol {
                symbol: 'q',
                position: 2
            })
        );
    }

    #[test]
    fn prefix_matching() {
        assert!(code("p").is_prefix_of("pnzn"));
        assert!(code("pnzn").is_prefix_of("pnzn"));
        assert!(!code("pnznh").is_prefix_of("pnzn"));
        assert!(!code("n").is_prefix_of("pnzn"));
        assert!(code("xn").is_prefix_of("pnzn"));
        assert!(code("x").is_prefix_of("s"));
        assert!(!code("x").is_prefix_of(""));
    }
}
