use crate::error::{Error, ParseError, ParseErrorKind};
use crate::zone::{DnsClass, RecordTtl, RecordType, ResourceRecord, ZoneEntry};
use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::str::FromStr;

/// Pull parser turning zone file text into [`ZoneEntry`] values.
///
/// Each call to [`ZoneParser::next_entry`] parses one entry, skipping blank and comment-only
/// lines. When an entry can't be parsed the rest of its line is skipped, so the following call
/// starts at the next line and callers can report more than one error per file.
pub struct ZoneParser<R> {
    reader: BufReader<R>,
    // 0-based, counts line feeds consumed so far.
    line_index: u32,
    fused: bool,
}

/// Per-entry state. Nothing is carried over between entries.
#[derive(Default)]
struct EntryState {
    parentheses_start_line: Option<u32>,
}

impl EntryState {
    fn in_parentheses(&self) -> bool {
        self.parentheses_start_line.is_some()
    }
}

enum Scanned {
    Entry(ZoneEntry),
    Empty,
    Eof,
}

/// An item of an entry, or the end of it. The end sticks: once a line feed outside of
/// parentheses (or EOF) is reached, every further read yields `End` again.
enum Lexeme {
    Item(String),
    End,
}

enum Fault {
    Parse(ParseErrorKind),
    Io(io::Error),
}

impl From<ParseErrorKind> for Fault {
    fn from(kind: ParseErrorKind) -> Self {
        Fault::Parse(kind)
    }
}

impl From<io::Error> for Fault {
    fn from(err: io::Error) -> Self {
        Fault::Io(err)
    }
}

/// Fields of a record that may come in any order before the `<RDATA>`.
#[derive(Default)]
struct RecordHead {
    ttl: Option<RecordTtl>,
    class: Option<DnsClass>,
    record_type: Option<RecordType>,
}

impl RecordHead {
    fn classify(&mut self, item: &str) -> Result<(), ParseErrorKind> {
        if item.as_bytes().first().is_some_and(u8::is_ascii_digit) {
            if self.ttl.is_some() {
                return Err(ParseErrorKind::DuplicateTtl(item.to_string()));
            }
            // TTLs inside records are read as 16 bit values, unlike the $TTL directive.
            let ttl: u16 = parse_decimal(item)?;
            self.ttl = Some(RecordTtl::from(ttl));
            return Ok(());
        }

        if let Some(class) = DnsClass::from_mnemonic(item) {
            if self.class.is_some() {
                return Err(ParseErrorKind::DuplicateClass(item.to_string()));
            }
            self.class = Some(class);
            return Ok(());
        }

        match RecordType::from_mnemonic(item) {
            Some(record_type) => {
                self.record_type = Some(record_type);
                Ok(())
            }
            None => Err(ParseErrorKind::InvalidRecordItem(item.to_string())),
        }
    }
}

fn parse_decimal<T: FromStr>(item: &str) -> Result<T, ParseErrorKind> {
    if item.is_empty() || !item.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseErrorKind::InvalidTtl(item.to_string()));
    }
    item.parse()
        .map_err(|_| ParseErrorKind::InvalidTtl(item.to_string()))
}

fn is_whitespace(chr: u8) -> bool {
    chr == b' ' || chr == b'\t'
}

fn is_newline(chr: u8) -> bool {
    chr == b'\n' || chr == b'\r'
}

impl<R: Read> ZoneParser<R> {
    pub fn new(reader: R) -> Self {
        ZoneParser {
            reader: BufReader::new(reader),
            line_index: 0,
            fused: false,
        }
    }

    /// Parse the next entry from the input.
    ///
    /// Returns `Ok(None)` once the end of the input has been reached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the entry is malformed. The parser is left at the start of the
    /// next line, so parsing can continue with another call.
    ///
    /// Returns [`Error::IO`] if reading the input fails. The parser does not try to recover from
    /// that and reports the end of the input from then on.
    pub fn next_entry(&mut self) -> Result<Option<ZoneEntry>, Error> {
        if self.fused {
            return Ok(None);
        }

        loop {
            let start_line = self.line_index;
            let mut state = EntryState::default();

            match self.scan_entry(&mut state) {
                Ok(Scanned::Entry(entry)) => return Ok(Some(entry)),
                Ok(Scanned::Empty) => self.skip_newlines().map_err(|err| self.fuse(err))?,
                Ok(Scanned::Eof) => return Ok(None),
                Err(Fault::Parse(kind)) => {
                    self.skip_until_eol().map_err(|err| self.fuse(err))?;
                    self.skip_newlines().map_err(|err| self.fuse(err))?;
                    return Err(ParseError {
                        line: start_line + 1,
                        kind,
                    }
                    .into());
                }
                Err(Fault::Io(err)) => return Err(self.fuse(err)),
            }
        }
    }

    /// The line the parser is currently on, 1-based.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line_index + 1
    }

    fn fuse(&mut self, err: io::Error) -> Error {
        self.fused = true;
        Error::IO(err)
    }

    fn scan_entry(&mut self, state: &mut EntryState) -> Result<Scanned, Fault> {
        if self.peek()?.is_none() {
            return Ok(Scanned::Eof);
        }

        let entry = match self.scan_entry_core(state)? {
            Some(entry) => entry,
            None => return Ok(Scanned::Empty),
        };

        // Records read every item up to the end already, but directives take a fixed number of
        // items so anything else left on the line is caught here.
        if let Lexeme::Item(item) = self.next_item(state)? {
            return Err(ParseErrorKind::UnexpectedItem(item).into());
        }

        if let Some(line) = state.parentheses_start_line {
            return Err(ParseErrorKind::UnclosedParentheses(line + 1).into());
        }

        let skipped = self.skip_until_eol()?;
        debug_assert_eq!(skipped, 0, "parser not at end of line after entry");
        self.skip_newlines()?;

        Ok(Scanned::Entry(entry))
    }

    fn scan_entry_core(&mut self, state: &mut EntryState) -> Result<Option<ZoneEntry>, Fault> {
        // Owner names and directives start at the very beginning of the line. An empty key means
        // the record inherits the owner of the previous one.
        let key = self.parse_loose_item()?;

        if key.starts_with('$') {
            return self.parse_directive(&key, state).map(Some);
        }

        self.parse_record(key, state)
    }

    fn parse_directive(&mut self, key: &str, state: &mut EntryState) -> Result<ZoneEntry, Fault> {
        match key.to_ascii_uppercase().as_str() {
            "$TTL" => {
                let value = self.expect_item(state, "$TTL")?;
                Ok(ZoneEntry::Ttl(parse_decimal(&value)?))
            }
            "$ORIGIN" => Ok(ZoneEntry::Origin(self.expect_item(state, "$ORIGIN")?)),
            "$INCLUDE" => {
                let file_name = self.expect_item(state, "$INCLUDE")?;
                let domain_name = match self.next_item(state)? {
                    Lexeme::Item(domain_name) => Some(domain_name),
                    Lexeme::End => None,
                };
                Ok(ZoneEntry::Include {
                    file_name,
                    domain_name,
                })
            }
            _ => Err(ParseErrorKind::UnknownDirective(key.to_string()).into()),
        }
    }

    fn expect_item(
        &mut self,
        state: &mut EntryState,
        directive: &'static str,
    ) -> Result<String, Fault> {
        match self.next_item(state)? {
            Lexeme::Item(item) => Ok(item),
            Lexeme::End => Err(ParseErrorKind::MissingDirectiveValue(directive).into()),
        }
    }

    fn parse_record(
        &mut self,
        key: String,
        state: &mut EntryState,
    ) -> Result<Option<ZoneEntry>, Fault> {
        let first = match self.next_item(state)? {
            Lexeme::Item(item) => item,
            // No owner and nothing after it: a blank or comment-only line.
            Lexeme::End if key.is_empty() => return Ok(None),
            Lexeme::End => return Err(ParseErrorKind::MissingRecordType.into()),
        };

        // The first two items decide the order of [<TTL>] [<class>] <type>. In the shortest
        // form the second one is already part of the <RDATA>.
        let mut head = RecordHead::default();
        let mut data = Vec::new();
        head.classify(&first)?;
        if head.record_type.is_some() {
            if let Lexeme::Item(item) = self.next_item(state)? {
                data.push(item);
            }
        } else {
            match self.next_item(state)? {
                Lexeme::Item(second) => head.classify(&second)?,
                Lexeme::End => return Err(ParseErrorKind::MissingRecordType.into()),
            }
        }

        let record_type = match head.record_type {
            Some(record_type) => record_type,
            None => match self.next_item(state)? {
                Lexeme::Item(item) => RecordType::from_mnemonic(&item)
                    .ok_or(ParseErrorKind::UnknownRecordType(item))?,
                Lexeme::End => return Err(ParseErrorKind::MissingRecordType.into()),
            },
        };

        while let Lexeme::Item(item) = self.next_item(state)? {
            data.push(item);
        }

        Ok(Some(ZoneEntry::Record(ResourceRecord {
            domain_name: (!key.is_empty()).then_some(key),
            class: head.class,
            ttl: head.ttl,
            record_type,
            data,
        })))
    }

    fn next_item(&mut self, state: &mut EntryState) -> Result<Lexeme, Fault> {
        loop {
            self.skip_whitespace()?;
            let Some(chr) = self.peek()? else {
                return Ok(Lexeme::End);
            };

            match chr {
                b';' => {
                    self.skip_until_eol()?;
                }
                b'\n' | b'\r' => {
                    if !state.in_parentheses() {
                        return Ok(Lexeme::End);
                    }
                    self.bump();
                    self.count_newline(chr);
                }
                b'(' => {
                    if state.in_parentheses() {
                        return Err(ParseErrorKind::NestedParentheses.into());
                    }
                    self.bump();
                    state.parentheses_start_line = Some(self.line_index);
                }
                b')' => {
                    if !state.in_parentheses() {
                        return Err(ParseErrorKind::UnopenedParentheses.into());
                    }
                    self.bump();
                    state.parentheses_start_line = None;
                }
                b'"' => {
                    self.bump();
                    return self.parse_quoted_item().map(Lexeme::Item);
                }
                _ => return self.parse_loose_item().map(Lexeme::Item),
            }
        }
    }

    /// Reads a run of characters up to whitespace, a line feed or one of `;()"`. Whitespace ending
    /// the item is consumed, the other delimiters are left for [`Self::next_item`].
    fn parse_loose_item(&mut self) -> Result<String, Fault> {
        let mut item = Vec::new();
        while let Some(chr) = self.peek()? {
            if is_whitespace(chr) {
                self.bump();
                break;
            }
            if is_newline(chr) || matches!(chr, b';' | b'(' | b')' | b'"') {
                break;
            }
            self.bump();
            item.push(chr);
        }
        into_string(item)
    }

    /// Reads up to the closing quote, which is consumed. Backslash escapes are not interpreted.
    fn parse_quoted_item(&mut self) -> Result<String, Fault> {
        let mut item = Vec::new();
        loop {
            let Some(chr) = self.peek()? else {
                return Err(ParseErrorKind::UnterminatedQuote.into());
            };
            self.bump();
            match chr {
                b'"' => return into_string(item),
                _ => {
                    self.count_newline(chr);
                    item.push(chr);
                }
            }
        }
    }

    /// Returns the number of bytes skipped before a line feed or EOF. The line feed is not
    /// consumed.
    fn skip_until_eol(&mut self) -> io::Result<usize> {
        let mut skipped = 0;
        while let Some(chr) = self.peek()? {
            if is_newline(chr) {
                break;
            }
            self.bump();
            skipped += 1;
        }
        Ok(skipped)
    }

    fn skip_newlines(&mut self) -> io::Result<()> {
        while let Some(chr) = self.peek()? {
            if !is_newline(chr) {
                break;
            }
            self.bump();
            self.count_newline(chr);
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) -> io::Result<()> {
        while let Some(chr) = self.peek()? {
            if !is_whitespace(chr) {
                break;
            }
            self.bump();
        }
        Ok(())
    }

    // CR and LF are both line terminators, only LF counts as a new line.
    fn count_newline(&mut self, chr: u8) {
        if chr == b'\n' {
            self.line_index += 1;
        }
    }

    fn peek(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    fn bump(&mut self) {
        self.reader.consume(1);
    }
}

fn into_string(item: Vec<u8>) -> Result<String, Fault> {
    String::from_utf8(item).map_err(|_| ParseErrorKind::InvalidUtf8.into())
}

impl<R: Read> Iterator for ZoneParser<R> {
    type Item = Result<ZoneEntry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}
