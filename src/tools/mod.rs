pub mod min_heap;
pub mod bit_window;
