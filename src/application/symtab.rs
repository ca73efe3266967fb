//! Symbol table parsing
//!
//! Reads `nm`-style dumps, one symbol per line:
//! - `<size> <type> <name>`
//! - `<address> <size> <type> <name>` (`go tool nm -size`)
//!
//! Sizes are decimal, or hexadecimal with a `0x` prefix. Lines of any other
//! shape are skipped.

use regex::Regex;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::SymbolRecord;

/// Records parsed from one symbol table dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymtabFile {
    pub records: Vec<SymbolRecord>,
    /// Number of lines that did not look like a symbol
    pub skipped: usize,
}

pub struct SymtabParser {
    line_regex: Regex,
}

impl Default for SymtabParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SymtabParser {
    pub fn new() -> Self {
        Self {
            line_regex: Regex::new(
                r"^\s*(?:(?P<addr>[0-9a-fA-F]+)\s+)?(?P<size>0[xX][0-9a-fA-F]+|[0-9]+)\s+(?P<kind>[A-Za-z?-])\s+(?P<name>\S.*?)\s*$",
            )
            .unwrap(),
        }
    }

    /// Parse a single line, `None` if it is not a symbol record.
    pub fn parse_line(&self, line: &str) -> Option<SymbolRecord> {
        let caps = self.line_regex.captures(line)?;
        let size = parse_size(caps.name("size")?.as_str())?;
        let address = caps
            .name("addr")
            .and_then(|m| u64::from_str_radix(m.as_str(), 16).ok());
        Some(SymbolRecord {
            name: caps.name("name")?.as_str().to_string(),
            size,
            kind: caps.name("kind").and_then(|m| m.as_str().chars().next()),
            address,
        })
    }

    /// Parse all lines; fails only when not a single record was found.
    #[instrument(level = "debug", skip_all)]
    pub fn parse<'a, I>(&self, lines: I) -> ApplicationResult<SymtabFile>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut file = SymtabFile::default();
        for (number, line) in lines.into_iter().enumerate() {
            match self.parse_line(line) {
                Some(record) => file.records.push(record),
                None => {
                    file.skipped += 1;
                    debug!("skip line {}: {:?}", number + 1, line);
                }
            }
        }

        info!(
            "symtab: {} symbols, {} lines skipped",
            file.records.len(),
            file.skipped
        );
        if file.records.is_empty() {
            return Err(ApplicationError::EmptySymbolTable {
                skipped: file.skipped,
            });
        }
        Ok(file)
    }

    pub fn parse_str(&self, input: &str) -> ApplicationResult<SymtabFile> {
        self.parse(input.lines())
    }
}

fn parse_size(s: &str) -> Option<u64> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("100 T pkg/a.Foo", "pkg/a.Foo", 100, 'T', None)]
    #[case("  47e8a0         32 T runtime.main", "runtime.main", 32, 'T', Some(0x47e8a0))]
    #[case("0x1f r go:buildid", "go:buildid", 31, 'r', None)]
    #[case("4a2b40 16 D type:.eq.struct { a int }  ", "type:.eq.struct { a int }", 16, 'D', Some(0x4a2b40))]
    fn given_symbol_line_when_parsing_then_extracts_fields(
        #[case] line: &str,
        #[case] name: &str,
        #[case] size: u64,
        #[case] kind: char,
        #[case] address: Option<u64>,
    ) {
        let record = SymtabParser::new().parse_line(line).unwrap();
        assert_eq!(record.name, name);
        assert_eq!(record.size, size);
        assert_eq!(record.kind, Some(kind));
        assert_eq!(record.address, address);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("mode: set")]
    #[case("                 U runtime.undefined")]
    #[case("T only-a-type-and-name")]
    #[case("99999999999999999999999 T overflow.Size")]
    fn given_malformed_line_when_parsing_then_returns_none(#[case] line: &str) {
        assert!(SymtabParser::new().parse_line(line).is_none());
    }

    #[test]
    fn given_mixed_input_when_parsing_then_skips_bad_lines() {
        let input = "header line\n100 T pkg/a.Foo\n\n50 T pkg/b.Bar\n";
        let file = SymtabParser::new().parse_str(input).unwrap();
        assert_eq!(file.records.len(), 2);
        assert_eq!(file.skipped, 2);
        assert_eq!(file.records[1].name, "pkg/b.Bar");
    }

    #[test]
    fn given_no_symbols_when_parsing_then_fails_with_empty_table() {
        let result = SymtabParser::new().parse_str("nothing\nhere\n");
        assert!(matches!(
            result,
            Err(ApplicationError::EmptySymbolTable { skipped: 2 })
        ));
    }
}
