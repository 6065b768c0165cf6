//! Bounded min-heap used to order pending tree nodes by weight.
//!
//! The capacity is fixed at creation and equals the alphabet size; the
//! Huffman algorithm only shrinks the queue after seeding, so a correctly
//! sized heap never reports full.

use crate::Error;

pub struct MinHeap<T> {
    slots: Vec<(f32,T)>,
    capacity: usize
}

impl <T> MinHeap<T> {
    pub fn create(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity
        }
    }
    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
    /// Add an item, maintaining heap order by sifting up while the parent
    /// at `(i-1)/2` is strictly heavier.  Equal weights never swap, so the
    /// result is deterministic for a given insertion order.
    pub fn enqueue(&mut self,weight: f32,item: T) -> Result<(),Error> {
        if self.slots.len() == self.capacity {
            return Err(Error::QueueFull);
        }
        self.slots.push((weight,item));
        let mut i = self.slots.len() - 1;
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.slots[i].0 < self.slots[parent].0 {
                self.slots.swap(i,parent);
                i = parent;
            } else {
                break;
            }
        }
        Ok(())
    }
    /// Remove and return the minimum-weight item, or `None` if the heap
    /// is empty.  The last slot moves into the vacated root and sifts down,
    /// swapping with the strictly lighter child (left child wins ties).
    pub fn dequeue(&mut self) -> Option<(f32,T)> {
        if self.slots.is_empty() {
            return None;
        }
        let last = self.slots.len() - 1;
        self.slots.swap(0,last);
        let ans = self.slots.pop();
        let mut i = 0;
        loop {
            let lchild = 2*i + 1;
            let rchild = 2*i + 2;
            if lchild >= self.slots.len() {
                break;
            }
            let mut lightest = lchild;
            if rchild < self.slots.len() && self.slots[rchild].0 < self.slots[lchild].0 {
                lightest = rchild;
            }
            if self.slots[lightest].0 < self.slots[i].0 {
                self.slots.swap(i,lightest);
                i = lightest;
            } else {
                break;
            }
        }
        ans
    }
}

// *************** TESTS *****************

#[test]
fn ordering() {
    let mut heap: MinHeap<char> = MinHeap::create(8);
    for (w,c) in [(5.0,'a'),(2.0,'b'),(1.0,'c'),(1.0,'d')] {
        heap.enqueue(w,c).expect("enqueue failed");
    }
    assert_eq!(heap.dequeue().unwrap().0,1.0);
    assert_eq!(heap.dequeue().unwrap().0,1.0);
    assert_eq!(heap.dequeue().unwrap().0,2.0);
    assert!(!heap.is_empty());
    assert_eq!(heap.dequeue().unwrap().0,5.0);
    assert!(heap.is_empty());
    assert!(heap.dequeue().is_none());
}

#[test]
fn interleaved() {
    let mut heap: MinHeap<usize> = MinHeap::create(8);
    heap.enqueue(3.0,0).unwrap();
    heap.enqueue(1.0,1).unwrap();
    assert_eq!(heap.dequeue().unwrap(),(1.0,1));
    heap.enqueue(0.5,2).unwrap();
    heap.enqueue(4.0,3).unwrap();
    assert_eq!(heap.dequeue().unwrap(),(0.5,2));
    assert_eq!(heap.dequeue().unwrap(),(3.0,0));
    heap.enqueue(2.0,4).unwrap();
    assert_eq!(heap.dequeue().unwrap(),(2.0,4));
    assert_eq!(heap.dequeue().unwrap(),(4.0,3));
}

#[test]
fn full_queue() {
    let mut heap: MinHeap<u8> = MinHeap::create(2);
    heap.enqueue(1.0,0).unwrap();
    heap.enqueue(2.0,1).unwrap();
    assert!(matches!(heap.enqueue(3.0,2),Err(Error::QueueFull)));
}
