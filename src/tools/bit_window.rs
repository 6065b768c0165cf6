//! Sliding bit window for the decoder.
//!
//! Holds bits that have been read from the compressed stream but not yet
//! matched against a code.  The capacity is twice the maximum code length,
//! which guarantees a code spanning a chunk boundary is never lost between
//! reads.

use crate::{Error,MAX_CODE_BITS};

const WINDOW_BITS: usize = 2 * MAX_CODE_BITS;

pub struct BitWindow {
    buf: [bool;WINDOW_BITS],
    /// start of the bits belonging to the code currently being matched
    start: usize,
    len: usize
}

impl BitWindow {
    pub fn create() -> Self {
        Self {
            buf: [false;WINDOW_BITS],
            start: 0,
            len: 0
        }
    }
    /// Append a newly read bit.  Errors if the pending run is already at
    /// the maximum code length: no valid table contains a longer code, so
    /// the input is corrupt or the wrong table is in use.
    pub fn push(&mut self,bit: bool) -> Result<(),Error> {
        if self.len - self.start >= MAX_CODE_BITS {
            return Err(Error::MalformedEncoding);
        }
        if self.len == WINDOW_BITS {
            self.compact();
        }
        self.buf[self.len] = bit;
        self.len += 1;
        Ok(())
    }
    /// bits accumulated for the code currently being matched
    pub fn pending(&self) -> &[bool] {
        &self.buf[self.start..self.len]
    }
    pub fn pending_len(&self) -> usize {
        self.len - self.start
    }
    /// a code was matched, the next code starts at the next bit
    pub fn mark_matched(&mut self) {
        self.start = self.len;
    }
    /// shift unmatched bits to the front, called at chunk boundaries
    pub fn compact(&mut self) {
        let n = self.len - self.start;
        self.buf.copy_within(self.start..self.len,0);
        self.start = 0;
        self.len = n;
    }
}

// *************** TESTS *****************

#[test]
fn pending_and_match() {
    let mut win = BitWindow::create();
    win.push(true).unwrap();
    win.push(false).unwrap();
    assert_eq!(win.pending(),&[true,false]);
    win.mark_matched();
    assert_eq!(win.pending_len(),0);
    win.push(true).unwrap();
    assert_eq!(win.pending(),&[true]);
}

#[test]
fn compaction() {
    let mut win = BitWindow::create();
    for i in 0..10 {
        win.push(i % 2 == 0).unwrap();
    }
    win.mark_matched();
    win.push(true).unwrap();
    win.push(true).unwrap();
    win.compact();
    assert_eq!(win.pending(),&[true,true]);
}

#[test]
fn overflow_is_malformed() {
    let mut win = BitWindow::create();
    for _i in 0..MAX_CODE_BITS {
        win.push(false).unwrap();
    }
    assert!(matches!(win.push(false),Err(Error::MalformedEncoding)));
}

#[test]
fn spans_many_chunks() {
    // pending bits survive repeated compaction at chunk boundaries
    let mut win = BitWindow::create();
    for chunk in 0..20 {
        for b in 0..8 {
            win.push((chunk + b) % 3 == 0).unwrap();
        }
        if win.pending_len() >= MAX_CODE_BITS - 8 {
            win.mark_matched();
        }
        win.compact();
    }
}
