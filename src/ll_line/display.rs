use super::association::AssociatedSpan;
use super::*;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

/// Zero-based index to a base-26 label: A, B, ..., Z, AA, AB, ...
fn index_to_base26_label(mut n: usize) -> String {
    let mut result = String::new();
    loop {
        let remainder = n % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

struct IncludedAttr {
    range: LRange,
    debug_value: String,
    associations: Vec<AssociatedSpan>,
    show_associations: bool,
}

/// Renders a line with its attributes underlined.
///
/// ```text
/// с     1     марта     по     5     мая
/// ╰────────────────────────────────────╯DateExpression(fr: Month 3; Day 1 | to: Month 5; Day 5)
/// ```
pub struct LLLineDisplay<'a> {
    ll_line: &'a LLLine,
    include_attrs: Vec<IncludedAttr>,
}

fn printable(text: &str) -> String {
    text.replace("\r\n", "↵").replace(['\n', '\r'], "↵")
}

impl<'a> std::fmt::Display for LLLineDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const SPACE_PADDING: usize = 2;
        let mut start_columns = Vec::new();
        let mut end_columns = Vec::new();
        let mut opening_line = String::new();
        for (i, ll_token) in self.ll_line.ll_tokens().iter().enumerate() {
            if i > 0 {
                opening_line.extend(std::iter::repeat(' ').take(SPACE_PADDING));
            }
            start_columns.push(UnicodeWidthStr::width(&*opening_line));
            opening_line.push_str(&printable(ll_token.text()));
            end_columns.push(UnicodeWidthStr::width(&*opening_line));
        }

        f.write_str(&opening_line)?;

        let span_labels = self.build_span_labels();

        for attr in self.include_attrs.iter() {
            let (Some(&start_col), Some(&end_col)) =
                (start_columns.get(attr.range.0), end_columns.get(attr.range.1))
            else {
                continue;
            };
            f.write_char('\n')?;
            for _ in 0..start_col {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;
            let char_len = end_col - start_col;
            for _ in (start_col + 1)..end_col.saturating_sub(1) {
                f.write_char('─')?;
            }
            if char_len > 1 {
                f.write_char('╯')?;
            }

            if let Some(label) = span_labels.get(&attr.range) {
                write!(f, "{} ", label)?;
            }

            f.write_str(&attr.debug_value)?;

            if attr.show_associations {
                for assoc in &attr.associations {
                    f.write_char('\n')?;
                    for _ in 0..(start_col + 2) {
                        f.write_char(' ')?;
                    }
                    let target = (assoc.span.start_idx, assoc.span.end_idx);
                    let target_str = span_labels
                        .get(&target)
                        .cloned()
                        .unwrap_or_else(|| format!("[{}..{}]", target.0, target.1));
                    write!(
                        f,
                        "└─{}{}─>{}",
                        assoc.glyph().unwrap_or(""),
                        assoc.label(),
                        target_str
                    )?;
                }
            }
        }

        Ok(())
    }
}

impl<'a> LLLineDisplay<'a> {
    pub fn new(ll_line: &'a LLLine) -> Self {
        LLLineDisplay {
            ll_line,
            include_attrs: Vec::new(),
        }
    }

    /// Labels "[A]", "[B]", ... for included ranges targeted by associations.
    fn build_span_labels(&self) -> HashMap<LRange, String> {
        let included: HashSet<LRange> = self.include_attrs.iter().map(|a| a.range).collect();
        let mut targets: Vec<LRange> = self
            .include_attrs
            .iter()
            .filter(|a| a.show_associations)
            .flat_map(|a| &a.associations)
            .map(|assoc| (assoc.span.start_idx, assoc.span.end_idx))
            .filter(|range| included.contains(range))
            .collect();
        targets.sort();
        targets.dedup();

        targets
            .into_iter()
            .enumerate()
            .map(|(i, range)| (range, format!("[{}]", index_to_base26_label(i))))
            .collect()
    }

    fn push_attrs<T: 'static>(&mut self, show_associations: bool) {
        let entries: Vec<IncludedAttr> = self
            .ll_line
            .attrs()
            .debug_entries::<T>()
            .map(|(range, debug_value, associations)| IncludedAttr {
                range,
                debug_value: debug_value.to_string(),
                associations: associations.to_vec(),
                show_associations,
            })
            .collect();
        self.include_attrs.extend(entries);
    }

    pub fn include<T: 'static + std::fmt::Debug>(&mut self) {
        self.push_attrs::<T>(false);
    }

    /// Like [`include`](Self::include), also rendering association arrows.
    pub fn include_with_associations<T: 'static + std::fmt::Debug>(&mut self) {
        self.push_attrs::<T>(true);
    }

    pub fn with<T: 'static + std::fmt::Debug>(mut self) -> Self {
        self.include::<T>();
        self
    }

    pub fn with_associations<T: 'static + std::fmt::Debug>(mut self) -> Self {
        self.include_with_associations::<T>();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base26_labels() {
        assert_eq!(index_to_base26_label(0), "A");
        assert_eq!(index_to_base26_label(25), "Z");
        assert_eq!(index_to_base26_label(26), "AA");
        assert_eq!(index_to_base26_label(51), "AZ");
        assert_eq!(index_to_base26_label(701), "ZZ");
        assert_eq!(index_to_base26_label(702), "AAA");
    }

    #[test]
    fn newlines_render_on_one_line() {
        let line = create_line_from_string("март\n2023");
        let display = LLLineDisplay::new(&line);
        insta::assert_snapshot!(display, @"март  ↵  2023");
    }
}
