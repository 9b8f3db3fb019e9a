/// Iterator which keeps only the lines of a page that sit inside a transaction table
///
/// The detector is a two-state machine:
///
/// 1. `Outside` until a header line is seen. A header mentions `transaction` along with
///    one of `date`, `description` or `amount`, e.g. `"Transaction Date  Description  Amount"`.
///    The header itself is not yielded.
/// 2. `Inside` until a footer line (`total`, `balance`, `summary`) or a blank line. Every
///    other line is yielded.
///
/// A page can enter and leave the table several times, all inside lines are yielded in
/// order.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct TransactionSection<I> {
    iter: I,
    state: SectionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionState {
    Outside,
    Inside,
}

const HEADER_ANCHOR: &str = "transaction";
const HEADER_KEYWORDS: [&str; 3] = ["date", "description", "amount"];
const FOOTER_KEYWORDS: [&str; 3] = ["total", "balance", "summary"];

impl<I> TransactionSection<I> {
    fn new(iter: I) -> Self {
        Self {
            iter,
            state: SectionState::Outside,
        }
    }

    fn is_header(line: &str) -> bool {
        let line = line.to_lowercase();
        line.contains(HEADER_ANCHOR)
            && HEADER_KEYWORDS
                .iter()
                .any(|keyword| line.contains(keyword))
    }

    fn is_footer(line: &str) -> bool {
        if line.trim().is_empty() {
            return true;
        }
        let line = line.to_lowercase();
        FOOTER_KEYWORDS.iter().any(|keyword| line.contains(keyword))
    }
}

impl<'a, I: Iterator<Item = &'a str>> Iterator for TransactionSection<I> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.iter.by_ref() {
            match self.state {
                SectionState::Outside => {
                    if Self::is_header(line) {
                        self.state = SectionState::Inside;
                    }
                }
                SectionState::Inside => {
                    if Self::is_footer(line) {
                        self.state = SectionState::Outside;
                    } else {
                        return Some(line);
                    }
                }
            }
        }
        None
    }
}

pub trait IteratorExt {
    fn transaction_section(self) -> TransactionSection<Self>
    where
        Self: Sized;
}

impl<'a, I: Iterator<Item = &'a str>> IteratorExt for I {
    fn transaction_section(self) -> TransactionSection<I> {
        TransactionSection::new(self)
    }
}

/// Text of the transaction table(s) on `page`, or `None` when the page has no header.
pub fn detect_section(page: &str) -> Option<String> {
    let lines: Vec<&str> = page.lines().transaction_section().collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
