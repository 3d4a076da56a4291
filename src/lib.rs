#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Date, time and date-range extraction for layered token lines.
//!
//! Phrases in Russian, Ukrainian, English and Italian ("с 1 по 5 марта",
//! "3 дня назад", "from March 2023 to June 2023", "последний день 2 квартала
//! 2024 года") are read into [`DateExpression`]s, which resolve to concrete
//! dates against an anchor instant or persist as relative referents.
//!
//! ## Pipeline
//!
//! - [`PrimitiveParser`] recognizes one [`DateFragment`] at a cursor.
//! - [`ChainBuilder`] strings fragments into a contiguous chain.
//! - [`ExpressionParser`] classifies chains and splits ranges on "с/по",
//!   "from/to" and hyphens.
//! - [`ValueResolver`] turns fragments into dates.
//! - [`ReferentBridge`] stores expressions in a [`ReferentArena`] and reads
//!   them back.
//!
//! ## Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use layered_dates::{create_line_from_string, DateExpression, DateExpressionResolver, Tense};
//!
//! let line = create_line_from_string("Отчёт за период с 1 по 5 марта 2023 года")
//!     .run(&DateExpressionResolver::standard());
//! let now = NaiveDate::from_ymd_opt(2024, 6, 15)
//!     .and_then(|d| d.and_hms_opt(0, 0, 0))
//!     .unwrap();
//!
//! let (_, expr) = line.attrs_by::<DateExpression>()[0];
//! let (start, end) = expr.to_date_range(now, Tense::Unspecified).unwrap();
//! assert_eq!(start.date(), NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
//! assert_eq!(end.date(), NaiveDate::from_ymd_opt(2023, 3, 5).unwrap());
//! ```

mod bridge;
mod chain;
mod config;
mod date_resolver;
mod errors;
mod expression;
mod format;
mod fragment;
mod lexicon;
mod ll_line;
mod primitive;
mod referent;
mod resolver;

#[cfg(test)]
mod tests {
    mod bridge;
    mod chain;
    mod expression;
    mod properties;
    mod recognizer;
    mod resolver;
}

pub use bridge::ReferentBridge;
pub use chain::ChainBuilder;
pub use config::ParserConfig;
pub use date_resolver::{DateExpressionResolver, ImportedReferent};
pub use errors::{DateError, DateResult};
pub use expression::{DateExpression, ExpressionParser};
pub use format::{describe, format_referent, format_resolution};
pub use fragment::{sort_fragments, DateFragment, ExpressionFragment, FragmentKind, Granule, PointerKind};
pub use lexicon::{LexEntry, Lexeme, Lexicon, MorphClass};
pub use ll_line::{
    create_line_from_string, create_line_with_lexicon, AssociatedSpan, Association, AssociationAny, Cursor,
    LLCursorAssignment, LLLine, LLLineDisplay, LLSelection, LLToken, LRange, LToken, Resolver, SpanRef, TextTag,
};
pub use primitive::PrimitiveParser;
pub use referent::{DateRangeReferent, DateReferent, RangeId, ReferentArena, ReferentHandle, ReferentId};
pub use resolver::{days_in_month, is_leap_year, ResolvedValue, Tense, ValueResolver};
