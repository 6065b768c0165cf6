//! Huffman code generation.
//!
//! Builds a prefix-free code table from a static set of symbol weights.
//! The classic queue-driven construction is used: seed a min-heap with one
//! leaf per symbol, then repeatedly merge the two lightest entries into an
//! internal node until a single root remains.  A pre-order traversal of
//! the finished tree assigns each leaf the path taken to reach it, left
//! branches contributing 0 and right branches 1.  Prefix-freeness follows
//! from codes being assigned at leaves only.
//!
//! Ties between equal weights resolve by heap structure (equal weights
//! never swap during sifting), so a given insertion order always produces
//! the same table.  The tree itself is transient: it lives only long
//! enough to be traversed into the table.

use crate::table::{Code,CodeTable};
use crate::tools::min_heap::MinHeap;
use crate::{Error,MAX_ALPHABET_LEN,MAX_CODE_BITS};

/// Input to code generation: a named sequence of (symbol, weight) pairs.
/// Symbols are expected to be unique; order affects tie-breaking but not
/// correctness.
pub struct Frequencies {
    name: String,
    pairs: Vec<(u8,f32)>
}

impl Frequencies {
    pub fn create(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pairs: Vec::new()
        }
    }
    pub fn from_pairs(name: &str,pairs: &[(u8,f32)]) -> Self {
        Self {
            name: name.to_string(),
            pairs: pairs.to_vec()
        }
    }
    /// count byte occurrences in a buffer, symbols in ascending byte order
    pub fn tally(name: &str,data: &[u8]) -> Self {
        let mut counts = [0u64;256];
        for b in data {
            counts[*b as usize] += 1;
        }
        let mut ans = Self::create(name);
        for sym in 0..=255u8 {
            if counts[sym as usize] > 0 {
                ans.add(sym,counts[sym as usize] as f32);
            }
        }
        ans
    }
    pub fn add(&mut self,symbol: u8,weight: f32) {
        self.pairs.push((symbol,weight));
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Transient binary tree node; internal nodes own their two children.
enum Node {
    Leaf(u8),
    Internal(Box<Node>,Box<Node>)
}

/// assign each leaf's path, restoring the shared path buffer after both
/// branches of an internal node return
fn walk(node: &Node,path: &mut Vec<bool>,table: &mut CodeTable) -> Result<(),Error> {
    match node {
        Node::Leaf(symbol) => {
            table.push_entry(*symbol,Code::from_bits(path));
            Ok(())
        },
        Node::Internal(left,right) => {
            if path.len() == MAX_CODE_BITS {
                // a child code would be longer than any table can hold
                return Err(Error::EncodingTooLong);
            }
            path.push(false);
            walk(left,path,table)?;
            path.pop();
            path.push(true);
            walk(right,path,table)?;
            path.pop();
            Ok(())
        }
    }
}

/// Run the Huffman algorithm over `freqs`, producing a code table that
/// inherits its name.  Fewer than 2 symbols, more than [MAX_ALPHABET_LEN],
/// or a negative or non-finite weight is an `InvalidAlphabet` error; a
/// tree deeper than [MAX_CODE_BITS] is `EncodingTooLong`.
pub fn generate(freqs: &Frequencies) -> Result<CodeTable,Error> {
    if freqs.pairs.len() < 2 || freqs.pairs.len() > MAX_ALPHABET_LEN {
        return Err(Error::InvalidAlphabet);
    }
    if freqs.pairs.iter().any(|(_s,w)| !w.is_finite() || *w < 0.0) {
        return Err(Error::InvalidAlphabet);
    }
    log::debug!("seeding queue with {} symbols",freqs.pairs.len());
    let mut heap: MinHeap<Node> = MinHeap::create(freqs.pairs.len());
    for (symbol,weight) in &freqs.pairs {
        heap.enqueue(*weight,Node::Leaf(*symbol))?;
    }
    log::debug!("entering merge loop");
    let root: Node;
    loop {
        let (w1,n1) = match heap.dequeue() {
            Some(entry) => entry,
            None => return Err(Error::InvalidAlphabet)
        };
        match heap.dequeue() {
            Some((w2,n2)) => {
                log::trace!("merge weights {} and {}",w1,w2);
                heap.enqueue(w1 + w2,Node::Internal(Box::new(n1),Box::new(n2)))?;
            },
            None => {
                // nothing left to merge with, n1 is the root
                root = n1;
                break;
            }
        }
    }
    let mut table = CodeTable::create(freqs.name());
    let mut path: Vec<bool> = Vec::with_capacity(MAX_CODE_BITS);
    walk(&root,&mut path,&mut table)?;
    Ok(table)
}

// *************** TESTS *****************

#[cfg(test)]
fn is_prefix(a: &Code,b: &Code) -> bool {
    a.len() <= b.len() && a.iter().zip(b.iter()).all(|(x,y)| x == y)
}

#[test]
fn merge_order() {
    // c and d (weight 1 each) merge first, their parent (weight 2) then
    // competes with b; the heaviest symbol gets the shortest code
    let freqs = Frequencies::from_pairs("abcd",&[(b'a',5.0),(b'b',2.0),(b'c',1.0),(b'd',1.0)]);
    let table = generate(&freqs).expect("generation failed");
    assert_eq!(table.len(),4);
    assert_eq!(table.lookup(b'a').unwrap().len(),1);
    assert_eq!(table.lookup(b'b').unwrap().len(),2);
    assert_eq!(table.lookup(b'c').unwrap().len(),3);
    assert_eq!(table.lookup(b'd').unwrap().len(),3);
    for i in 0..table.len() {
        assert!(table.entry(i).1.len() >= table.lookup(b'a').unwrap().len());
    }
}

#[test]
fn prefix_free() {
    let freqs = Frequencies::tally("sam","I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes());
    let table = generate(&freqs).expect("generation failed");
    for i in 0..table.len() {
        for j in 0..table.len() {
            if i != j {
                let (_si,ci) = table.entry(i);
                let (_sj,cj) = table.entry(j);
                assert!(!is_prefix(ci,cj));
            }
        }
    }
}

#[test]
fn determinism() {
    let pairs: Vec<(u8,f32)> = (0..40u8).map(|s| (s,((s as u32 * 7 + 3) % 11) as f32 + 1.0)).collect();
    let t1 = generate(&Frequencies::from_pairs("f",&pairs)).expect("generation failed");
    let t2 = generate(&Frequencies::from_pairs("f",&pairs)).expect("generation failed");
    assert_eq!(t1,t2);
}

#[test]
fn alphabet_too_small() {
    let freqs = Frequencies::from_pairs("one",&[(b'a',1.0)]);
    assert!(matches!(generate(&freqs),Err(Error::InvalidAlphabet)));
    let empty = Frequencies::create("none");
    assert!(matches!(generate(&empty),Err(Error::InvalidAlphabet)));
}

#[test]
fn alphabet_too_large() {
    let pairs: Vec<(u8,f32)> = (0..=MAX_ALPHABET_LEN as u8).map(|s| (s,1.0)).collect();
    let freqs = Frequencies::from_pairs("big",&pairs);
    assert!(matches!(generate(&freqs),Err(Error::InvalidAlphabet)));
}

#[test]
fn bad_weights() {
    let freqs = Frequencies::from_pairs("neg",&[(b'a',1.0),(b'b',-2.0)]);
    assert!(matches!(generate(&freqs),Err(Error::InvalidAlphabet)));
    let freqs = Frequencies::from_pairs("nan",&[(b'a',1.0),(b'b',f32::NAN)]);
    assert!(matches!(generate(&freqs),Err(Error::InvalidAlphabet)));
}

#[test]
fn code_too_long() {
    // power-of-two weights force a fully skewed tree; 34 symbols put the
    // deepest leaf at 33 bits
    let mut freqs = Frequencies::create("deep");
    freqs.add(0,1.0);
    for i in 0..33u8 {
        freqs.add(i + 1,f32::powi(2.0,i as i32));
    }
    assert!(matches!(generate(&freqs),Err(Error::EncodingTooLong)));
}

#[test]
fn deep_but_legal() {
    // one fewer symbol keeps the deepest leaf at exactly 32 bits
    let mut freqs = Frequencies::create("deep");
    freqs.add(0,1.0);
    for i in 0..32u8 {
        freqs.add(i + 1,f32::powi(2.0,i as i32));
    }
    let table = generate(&freqs).expect("generation failed");
    let longest = (0..table.len()).map(|i| table.entry(i).1.len()).max().unwrap();
    assert_eq!(longest,MAX_CODE_BITS);
}
