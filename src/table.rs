//! Code table model and its binary persistence.
//!
//! A code table maps each symbol of an alphabet to a prefix-free bit
//! sequence.  Tables are persisted in a fixed-layout binary file so the
//! whole image can be moved with a single read or write:
//!
//! `[5 byte magic "HFENC"] [name: 32 bytes, NUL padded] [symbol count: u32]
//! [alphabet: 128 bytes, zero-filled tail] [codes: 128 x 32 i32 arrays,
//! each terminated by -1, unused tail filled with -1]`
//!
//! All integers are little endian.  Each i32 in a code array is a single
//! bit (0 or 1) or the end-of-code sentinel; the sentinel keeps a code's
//! genuine leading zero bits distinct from "no bit here".
//!
//! Beyond the magic there is no structural validation on load: a corrupted
//! but magic-matching table is accepted and will produce corrupted output
//! on decode.  This is an accepted risk of the format, not silently fixed.

use bit_vec::BitVec;
use std::io::{Read,Write,ErrorKind};
use crate::{Error,MAGIC,MAX_NAME,MAX_ALPHABET_LEN,MAX_CODE_BITS,CODE_END};

/// bytes occupied by one code array in the file
const CODE_ARRAY_BYTES: usize = MAX_CODE_BITS * 4;
/// bytes following the magic
const PAYLOAD_BYTES: usize = MAX_NAME + 4 + MAX_ALPHABET_LEN + MAX_ALPHABET_LEN * CODE_ARRAY_BYTES;
/// total size of a code table file
pub const TABLE_FILE_BYTES: usize = MAGIC.len() + PAYLOAD_BYTES;

/// One symbol's bit sequence, 1 to 32 bits, ordered leftmost-first.
/// The explicit length stands in for the file's sentinel terminator.
#[derive(Clone,PartialEq,Debug)]
pub struct Code {
    bits: BitVec
}

impl Code {
    pub fn from_bits(path: &[bool]) -> Self {
        let mut bits = BitVec::with_capacity(path.len());
        for b in path {
            bits.push(*b);
        }
        Self { bits }
    }
    pub fn len(&self) -> usize {
        self.bits.len()
    }
    pub fn iter(&self) -> bit_vec::Iter<'_> {
        self.bits.iter()
    }
    /// true if the accumulated bits agree with this code up to and
    /// including the code's own terminator position
    pub fn matches(&self,pending: &[bool]) -> bool {
        self.bits.len() == pending.len() && self.bits.iter().zip(pending).all(|(a,b)| a == *b)
    }
    /// append this code's array to the file image
    fn pack(&self,img: &mut Vec<u8>) {
        for b in self.bits.iter() {
            img.extend_from_slice(&(b as i32).to_le_bytes());
        }
        for _i in self.bits.len()..MAX_CODE_BITS {
            img.extend_from_slice(&CODE_END.to_le_bytes());
        }
    }
    /// read a code array from the file image, stopping at the sentinel
    fn unpack(img: &[u8]) -> Self {
        let mut bits = BitVec::new();
        for i in 0..MAX_CODE_BITS {
            let val = i32::from_le_bytes([img[i*4],img[i*4+1],img[i*4+2],img[i*4+3]]);
            if val == CODE_END {
                break;
            }
            bits.push(val == 1);
        }
        Self { bits }
    }
}

/// In-memory code table: a name plus parallel (symbol, code) entries.
/// Invariants: at most [MAX_ALPHABET_LEN] entries, every code nonempty.
#[derive(Clone,PartialEq,Debug)]
pub struct CodeTable {
    name: String,
    symbols: Vec<u8>,
    codes: Vec<Code>
}

impl CodeTable {
    pub fn create(name: &str) -> Self {
        Self {
            name: name.to_string(),
            symbols: Vec::new(),
            codes: Vec::new()
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn len(&self) -> usize {
        self.symbols.len()
    }
    pub fn entry(&self,i: usize) -> (u8,&Code) {
        (self.symbols[i],&self.codes[i])
    }
    pub(crate) fn push_entry(&mut self,symbol: u8,code: Code) {
        self.symbols.push(symbol);
        self.codes.push(code);
    }
    /// find a symbol's code by linear scan of the alphabet
    pub fn lookup(&self,symbol: u8) -> Option<&Code> {
        for i in 0..self.symbols.len() {
            if self.symbols[i] == symbol {
                return Some(&self.codes[i]);
            }
        }
        None
    }
    /// find the symbol whose code equals the accumulated bits, if any
    pub fn match_pending(&self,pending: &[bool]) -> Option<u8> {
        for i in 0..self.codes.len() {
            if self.codes[i].matches(pending) {
                return Some(self.symbols[i]);
            }
        }
        None
    }
    /// Write the full fixed-size image.  Entries beyond the symbol count
    /// are zero-filled (alphabet) and sentinel-filled (codes) so the file
    /// is always [TABLE_FILE_BYTES] long.
    pub fn write_to<W: Write>(&self,writer: &mut W) -> Result<(),Error> {
        let mut img: Vec<u8> = Vec::with_capacity(TABLE_FILE_BYTES);
        img.extend_from_slice(MAGIC);
        let mut name_bytes = self.name.as_bytes().to_vec();
        name_bytes.truncate(MAX_NAME - 1);
        name_bytes.resize(MAX_NAME,0);
        img.extend_from_slice(&name_bytes);
        img.extend_from_slice(&(self.symbols.len() as u32).to_le_bytes());
        let mut alphabet = self.symbols.clone();
        alphabet.resize(MAX_ALPHABET_LEN,0);
        img.extend_from_slice(&alphabet);
        for code in &self.codes {
            code.pack(&mut img);
        }
        for _i in self.codes.len()..MAX_ALPHABET_LEN {
            for _j in 0..MAX_CODE_BITS {
                img.extend_from_slice(&CODE_END.to_le_bytes());
            }
        }
        writer.write_all(&img)?;
        writer.flush()?;
        Ok(())
    }
    /// Read a table, replacing every field wholesale.  A magic mismatch or
    /// a short image is `InvalidFormat`, other read failures are `Io`.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self,Error> {
        let mut magic = [0u8;5];
        match reader.read_exact(&mut magic) {
            Ok(()) => {},
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Err(Error::InvalidFormat),
            Err(e) => return Err(Error::Io(e))
        }
        if &magic != MAGIC {
            return Err(Error::InvalidFormat);
        }
        let mut img = vec![0u8;PAYLOAD_BYTES];
        match reader.read_exact(&mut img) {
            Ok(()) => {},
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Err(Error::InvalidFormat),
            Err(e) => return Err(Error::Io(e))
        }
        let name_end = img[0..MAX_NAME].iter().position(|b| *b == 0).unwrap_or(MAX_NAME);
        let name = String::from_utf8_lossy(&img[0..name_end]).to_string();
        let mut ptr = MAX_NAME;
        let count = u32::from_le_bytes([img[ptr],img[ptr+1],img[ptr+2],img[ptr+3]]);
        // a garbage count is not an error (see module docs), but it must
        // not read beyond the fixed arrays
        let count = (count as usize).min(MAX_ALPHABET_LEN);
        ptr += 4;
        let symbols = img[ptr..ptr+count].to_vec();
        ptr += MAX_ALPHABET_LEN;
        let mut codes = Vec::with_capacity(count);
        for i in 0..count {
            let arr = &img[ptr + i*CODE_ARRAY_BYTES..ptr + (i+1)*CODE_ARRAY_BYTES];
            codes.push(Code::unpack(arr));
        }
        Ok(Self { name, symbols, codes })
    }
    /// save this table to a file, see `write_to`
    pub fn save(&self,path: &str) -> Result<(),Error> {
        let mut file = std::fs::File::create(path)?;
        self.write_to(&mut file)
    }
    /// load a table from a file, see `read_from`
    pub fn load(path: &str) -> Result<Self,Error> {
        let mut file = std::fs::File::open(path)?;
        Self::read_from(&mut file)
    }
}

// *************** TESTS *****************

#[cfg(test)]
fn sample_table() -> CodeTable {
    let mut table = CodeTable::create("sample");
    table.push_entry(b'a',Code::from_bits(&[true]));
    table.push_entry(b'b',Code::from_bits(&[false,false]));
    table.push_entry(b'c',Code::from_bits(&[false,true,false]));
    table.push_entry(b'd',Code::from_bits(&[false,true,true]));
    table
}

#[test]
fn image_size_is_fixed() {
    let table = sample_table();
    let mut img: std::io::Cursor<Vec<u8>> = std::io::Cursor::new(Vec::new());
    table.write_to(&mut img).expect("write failed");
    assert_eq!(img.into_inner().len(),TABLE_FILE_BYTES);
}

#[test]
fn table_round_trip() {
    let table = sample_table();
    let mut img: std::io::Cursor<Vec<u8>> = std::io::Cursor::new(Vec::new());
    table.write_to(&mut img).expect("write failed");
    img.set_position(0);
    let loaded = CodeTable::read_from(&mut img).expect("read failed");
    assert_eq!(table,loaded);
}

#[test]
fn truncated_file_is_invalid_format() {
    let table = sample_table();
    let mut img: std::io::Cursor<Vec<u8>> = std::io::Cursor::new(Vec::new());
    table.write_to(&mut img).expect("write failed");
    let mut bytes = img.into_inner();
    bytes.truncate(4);
    let mut curs = std::io::Cursor::new(bytes);
    assert!(matches!(CodeTable::read_from(&mut curs),Err(Error::InvalidFormat)));
}

#[test]
fn short_payload_is_invalid_format() {
    let table = sample_table();
    let mut img: std::io::Cursor<Vec<u8>> = std::io::Cursor::new(Vec::new());
    table.write_to(&mut img).expect("write failed");
    let mut bytes = img.into_inner();
    bytes.truncate(100);
    let mut curs = std::io::Cursor::new(bytes);
    assert!(matches!(CodeTable::read_from(&mut curs),Err(Error::InvalidFormat)));
}

#[test]
fn bad_magic_is_invalid_format() {
    let mut bytes = vec![0u8;TABLE_FILE_BYTES];
    bytes[0..5].copy_from_slice(b"HFDEC");
    let mut curs = std::io::Cursor::new(bytes);
    assert!(matches!(CodeTable::read_from(&mut curs),Err(Error::InvalidFormat)));
}

#[test]
fn missing_file_is_io_error() {
    assert!(matches!(CodeTable::load("no_such_table.hfe"),Err(Error::Io(_))));
}

#[test]
fn long_name_is_truncated() {
    let mut table = sample_table();
    table.name = "x".repeat(40);
    let mut img: std::io::Cursor<Vec<u8>> = std::io::Cursor::new(Vec::new());
    table.write_to(&mut img).expect("write failed");
    img.set_position(0);
    let loaded = CodeTable::read_from(&mut img).expect("read failed");
    assert_eq!(loaded.name(),"x".repeat(31));
}
