use crate::model::Task;

/// Binary min-heap of pending tasks ordered by [`Task::key`].
///
/// Unlike `std::collections::BinaryHeap` it supports removing an arbitrary slot in
/// O(log n), which `complete` needs because the matched task is rarely the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingHeap {
    items: Vec<Task>,
}

impl PendingHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a heap from tasks in any order. An array that already satisfies the heap
    /// property is left as is, so a persisted heap reloads slot for slot.
    pub fn from_vec(items: Vec<Task>) -> Self {
        let mut heap = Self { items };
        for index in (0..heap.items.len() / 2).rev() {
            heap.sift_down(index);
        }
        heap
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, task: Task) {
        self.items.push(task);
        let last = self.items.len() - 1;
        self.sift_up(last);
    }

    pub fn peek(&self) -> Option<&Task> {
        self.items.first()
    }

    /// Slot of the first task named `name` in array order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|task| task.name == name)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Task> {
        if index >= self.items.len() {
            return None;
        }

        let removed = self.items.swap_remove(index);
        if index < self.items.len() {
            if index > 0 && self.less(index, (index - 1) / 2) {
                self.sift_up(index);
            } else {
                self.sift_down(index);
            }
        }
        Some(removed)
    }

    /// Tasks in heap array order.
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.items
    }

    /// Fully ordered copy; the heap itself is untouched.
    pub fn sorted(&self) -> Vec<&Task> {
        let mut sorted: Vec<&Task> = self.items.iter().collect();
        sorted.sort_by(|left, right| left.key().cmp(&right.key()));
        sorted
    }

    fn less(&self, left: usize, right: usize) -> bool {
        self.items[left].key() < self.items[right].key()
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.less(index, parent) {
                break;
            }
            self.items.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;

            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.items.swap(index, smallest);
            index = smallest;
        }
    }
}
