//! Line resolver producing [`DateExpression`] attributes.

use crate::config::ParserConfig;
use crate::expression::{DateExpression, ExpressionParser};
use crate::lexicon::Lexicon;
use crate::ll_line::{Association, LLCursorAssignment, LLSelection, Resolver};
use crate::primitive::PrimitiveParser;
use crate::referent::ReferentArena;

/// Links a date expression to a referent span it was built from.
#[derive(Debug, Clone, Copy)]
pub struct ImportedReferent;

impl Association for ImportedReferent {
    fn label(&self) -> &'static str {
        "imported"
    }

    fn glyph(&self) -> Option<&'static str> {
        Some("@")
    }
}

/// Finds the date expressions of a line, left to right, without overlap.
///
/// With an arena attached, spans already resolved to referents (see
/// [`ReferentBridge::attach_all`](crate::ReferentBridge::attach_all)) are
/// imported instead of being parsed again.
#[derive(Debug, Clone)]
pub struct DateExpressionResolver<'a> {
    lexicon: &'a Lexicon,
    config: ParserConfig,
    arena: Option<&'a ReferentArena>,
}

impl DateExpressionResolver<'static> {
    pub fn standard() -> Self {
        DateExpressionResolver::new(Lexicon::builtin(), ParserConfig::standard())
    }
}

impl<'a> DateExpressionResolver<'a> {
    pub fn new(lexicon: &'a Lexicon, config: ParserConfig) -> Self {
        DateExpressionResolver {
            lexicon,
            config,
            arena: None,
        }
    }

    pub fn with_arena(mut self, arena: &'a ReferentArena) -> Self {
        self.arena = Some(arena);
        self
    }
}

impl<'a> Default for DateExpressionResolver<'a> {
    fn default() -> Self {
        DateExpressionResolver::new(Lexicon::builtin(), ParserConfig::default())
    }
}

impl<'a> Resolver for DateExpressionResolver<'a> {
    type Attr = DateExpression;

    fn go(&self, sel: LLSelection) -> Vec<LLCursorAssignment<Self::Attr>> {
        let mut parser = PrimitiveParser::new(self.lexicon, &self.config);
        if let Some(arena) = self.arena {
            parser = parser.with_arena(arena);
        }
        if self.config.speed_regime {
            parser.prepare(sel.line());
        }

        let mut assignments = Vec::new();
        let mut covered: Option<usize> = None;
        for cur in sel.cursors() {
            if covered.map_or(false, |end| cur.idx() <= end) {
                continue;
            }
            let Ok(expr) = ExpressionParser::new(&mut parser).parse(cur) else {
                continue;
            };
            covered = Some(expr.span.end_idx);
            let imported = expr.imported.clone();
            let mut assignment = sel.sub(expr.span).finish_with_attr(expr);
            for span in imported {
                assignment = assignment.with_association(ImportedReferent, span);
            }
            assignments.push(assignment);
        }
        assignments
    }
}
