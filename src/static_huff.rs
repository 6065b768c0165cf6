//! Compression with a static Huffman code table.
//!
//! The encoder replaces each input byte with its code from the table,
//! packing bits LSB-first into output bytes.  The final content byte is
//! zero-padded to a byte boundary and followed by a one byte footer giving
//! the number of padding bits, so the decoder can trim the tail exactly
//! without reserving any bit pattern.
//!
//! Footer values run 0 to 7 for non-empty input.  Empty input produces a
//! single all-padding content byte and footer 8, which the decoder handles
//! with the same arithmetic as every other stream.
//!
//! * This transforms streams, the table must already be in memory
//! * The compressed stream is only decodable with the table that made it

use bit_vec::BitVec;
use std::io::{Cursor,Read,Write,Seek,SeekFrom,BufReader,BufWriter,ErrorKind};
use crate::table::CodeTable;
use crate::tools::bit_window::BitWindow;
use crate::Error;

/// bit_vec crate only handles MSB; this converts the leading whole bytes
/// in LSB-first order, leaving any remainder bits in place
fn drain_bytes_lsb0(bits: &mut BitVec) -> Vec<u8> {
    let byte_count = bits.len() / 8;
    let mut ans = Vec::new();
    for i in 0..byte_count {
        let mut val = 0;
        for b in 0..8 {
            val |= (bits.get(i*8 + b).unwrap() as u8) << b;
        }
        ans.push(val);
    }
    let mut rem = BitVec::new();
    for i in byte_count*8..bits.len() {
        rem.push(bits.get(i).unwrap());
    }
    *bits = rem;
    ans
}

/// Main compression function.
/// `expanded_in` is an object with the `Read` trait, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `compressed_out` is an object with the `Write` trait, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.  A byte with no table entry aborts
/// with `UnknownSymbol`; bytes already flushed stay in the sink.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W, table: &CodeTable) -> Result<(u64,u64),Error>
where R: Read, W: Write {
    let mut reader = BufReader::new(expanded_in);
    let mut writer = BufWriter::new(compressed_out);
    let mut bits = BitVec::new();
    let mut in_size: u64 = 0;
    let mut content_len: u64 = 0;
    let mut sym_in: [u8;1] = [0];
    log::debug!("entering encode loop");
    loop {
        match reader.read_exact(&mut sym_in) {
            Ok(()) => {
                let code = match table.lookup(sym_in[0]) {
                    Some(c) => c,
                    None => return Err(Error::UnknownSymbol(sym_in[0]))
                };
                log::trace!("symbol {:#04x} emits {} bits",sym_in[0],code.len());
                for b in code.iter() {
                    bits.push(b);
                }
                in_size += 1;
                if bits.len() >= 8 {
                    let bytes = drain_bytes_lsb0(&mut bits);
                    content_len += bytes.len() as u64;
                    writer.write_all(&bytes)?;
                }
            },
            Err(e) if e.kind()==ErrorKind::UnexpectedEof => {
                break;
            },
            Err(e) => return Err(Error::Io(e))
        }
    }
    // close out the final content byte; the stream always carries at least
    // one, even for empty input
    let padding: u8;
    if bits.len() > 0 {
        padding = (8 - bits.len()) as u8;
        while bits.len() < 8 {
            bits.push(false);
        }
        let bytes = drain_bytes_lsb0(&mut bits);
        content_len += 1;
        writer.write_all(&bytes)?;
    } else if content_len == 0 {
        padding = 8;
        content_len = 1;
        writer.write_all(&[0])?;
    } else {
        padding = 0;
    }
    log::debug!("{} content bytes, {} padding bits",content_len,padding);
    writer.write_all(&[padding])?;
    writer.flush()?;
    Ok((in_size,content_len + 1))
}

/// Main decompression function.
/// `compressed_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `expanded_out` is an object with the `Write` trait, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.  The stream must be at least one
/// content byte plus the footer, and every code must resolve within
/// the table's maximum code length, else `MalformedEncoding`.
pub fn expand<R,W>(compressed_in: &mut R, expanded_out: &mut W, table: &CodeTable) -> Result<(u64,u64),Error>
where R: Read + Seek, W: Write {
    let mut reader = BufReader::new(compressed_in);
    let mut writer = BufWriter::new(expanded_out);
    let total = reader.seek(SeekFrom::End(0))?;
    if total < 2 {
        return Err(Error::MalformedEncoding);
    }
    reader.seek(SeekFrom::Start(total - 1))?;
    let mut footer: [u8;1] = [0];
    reader.read_exact(&mut footer)?;
    let padding = footer[0] as usize;
    if padding > 8 {
        return Err(Error::MalformedEncoding);
    }
    reader.seek(SeekFrom::Start(0))?;
    let content_len = total - 1;
    let mut window = BitWindow::create();
    let mut out_size: u64 = 0;
    let mut byte_in: [u8;1] = [0];
    log::debug!("decoding {} content bytes, {} padding bits",content_len,padding);
    for i in 0..content_len {
        reader.read_exact(&mut byte_in)?;
        // the padding trim applies to the last content byte only
        let valid = match i == content_len - 1 {
            true => 8 - padding,
            false => 8
        };
        for b in 0..valid {
            window.push(byte_in[0] & (1 << b) != 0)?;
            if let Some(symbol) = table.match_pending(window.pending()) {
                writer.write_all(&[symbol])?;
                out_size += 1;
                window.mark_matched();
            }
        }
        window.compact();
    }
    if window.pending_len() > 0 {
        // stream ended in the middle of a code
        return Err(Error::MalformedEncoding);
    }
    writer.flush()?;
    Ok((total,out_size))
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8],table: &CodeTable) -> Result<Vec<u8>,Error> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    compress(&mut src,&mut ans,table)?;
    Ok(ans.into_inner())
}

/// Convenience function, calls `expand` with a slice returning a Vec
pub fn expand_slice(slice: &[u8],table: &CodeTable) -> Result<Vec<u8>,Error> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    expand(&mut src,&mut ans,table)?;
    Ok(ans.into_inner())
}

// *************** TESTS *****************

#[cfg(test)]
use crate::huffman::{Frequencies,generate};

#[cfg(test)]
fn abcd_table() -> CodeTable {
    // codes come out as a=1, b=00, c=010, d=011
    let freqs = Frequencies::from_pairs("abcd",&[(b'a',5.0),(b'b',2.0),(b'c',1.0),(b'd',1.0)]);
    generate(&freqs).expect("generation failed")
}

#[test]
fn compression_works() {
    // bits in table order: 1 00 010 011 -> LSB-first bytes 0x91 0x01,
    // 7 bits of the last byte are padding
    let table = abcd_table();
    let compressed = compress_slice("abcd".as_bytes(),&table).expect("compression failed");
    assert_eq!(compressed,hex::decode("910107").unwrap());
}

#[test]
fn invertibility() {
    let test_data = "aaabbcaddcabaaabdcba".as_bytes();
    let table = abcd_table();
    let compressed = compress_slice(test_data,&table).expect("compression failed");
    let expanded = expand_slice(&compressed,&table).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);
}

#[test]
fn invertibility_tallied() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let freqs = Frequencies::tally("sam",test_data);
    let table = generate(&freqs).expect("generation failed");
    let compressed = compress_slice(test_data,&table).expect("compression failed");
    let expanded = expand_slice(&compressed,&table).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);
}

#[test]
fn empty_input() {
    // one all-padding content byte plus footer 8
    let table = abcd_table();
    let compressed = compress_slice(&[],&table).expect("compression failed");
    assert_eq!(compressed,hex::decode("0008").unwrap());
    let expanded = expand_slice(&compressed,&table).expect("expansion failed");
    assert_eq!(expanded.len(),0);
}

#[test]
fn exact_byte_boundary() {
    // four 2-bit codes fill the content byte exactly, footer 0
    let table = abcd_table();
    let compressed = compress_slice("bbbb".as_bytes(),&table).expect("compression failed");
    assert_eq!(compressed,hex::decode("0000").unwrap());
    let expanded = expand_slice(&compressed,&table).expect("expansion failed");
    assert_eq!(expanded,"bbbb".as_bytes().to_vec());
}

#[test]
fn unknown_symbol() {
    let table = abcd_table();
    let mut src = Cursor::new("abz".as_bytes());
    let mut sink: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    match compress(&mut src,&mut sink,&table) {
        Err(Error::UnknownSymbol(sym)) => assert_eq!(sym,b'z'),
        _ => panic!("expected unknown symbol error")
    }
    // only 3 bits ever accumulate, so nothing was flushed and the
    // aborted call must leave the sink untouched
    assert!(sink.into_inner().is_empty());
}

#[test]
fn missing_footer() {
    let table = abcd_table();
    assert!(matches!(expand_slice(&[0x91],&table),Err(Error::MalformedEncoding)));
    assert!(matches!(expand_slice(&[],&table),Err(Error::MalformedEncoding)));
}

#[test]
fn footer_out_of_range() {
    let table = abcd_table();
    assert!(matches!(expand_slice(&[0x00,0x09],&table),Err(Error::MalformedEncoding)));
}

#[test]
fn truncated_mid_code() {
    // valid bits 0,1 form no complete code
    let table = abcd_table();
    assert!(matches!(expand_slice(&[0b0000_0010,6],&table),Err(Error::MalformedEncoding)));
}

#[test]
fn codes_span_byte_boundaries() {
    // long runs of 3-bit codes guarantee boundary-spanning codes
    let test_data = "cdcdcdcdcdcdcddcdcdcc".as_bytes();
    let table = abcd_table();
    let compressed = compress_slice(test_data,&table).expect("compression failed");
    let expanded = expand_slice(&compressed,&table).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);
}

#[test]
fn table_file_round_trip_decodes() {
    let test_data = "ddccbbaa".as_bytes();
    let table = abcd_table();
    let mut img: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    table.write_to(&mut img).expect("write failed");
    img.set_position(0);
    let loaded = CodeTable::read_from(&mut img).expect("read failed");
    let compressed = compress_slice(test_data,&table).expect("compression failed");
    let expanded = expand_slice(&compressed,&loaded).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);
}
