//! Очередь с приоритетами на «корзинах» целых чисел.
//!
//! Корзина с индексом `p` — это односвязный список элементов с приоритетом `p`.
//! Ссылки на следующий элемент хранятся не в очереди, а рядом с самими элементами
//! (через [`QueueLinks`]), поэтому постановка в очередь ничего не выделяет.
//!
//! Очередь корректна только для монотонной релаксации в духе Дейкстры: указатель
//! `minimum` при извлечении только растёт, и элемент с приоритетом ниже уже
//! извлечённых может быть пропущен до следующей постановки.

/// Доступ к приоритету и интрузивной ссылке элементов, хранящихся вне очереди.
pub trait QueueLinks {
    fn priority(&self, item: usize) -> usize;
    fn next_with_same_priority(&self, item: usize) -> Option<usize>;
    fn set_next_with_same_priority(&mut self, item: usize, next: Option<usize>);
}

#[derive(Debug, Clone)]
pub struct BucketQueue {
    buckets: Vec<Option<usize>>,
    minimum: usize,
    count: usize,
}

impl Default for BucketQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl BucketQueue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            minimum: usize::MAX,
            count: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Ставит элемент в голову корзины `priority`. Амортизированно O(1).
    pub fn enqueue<L: QueueLinks + ?Sized>(&mut self, links: &mut L, item: usize, priority: usize) {
        self.count += 1;
        if priority < self.minimum {
            self.minimum = priority;
        }
        if priority >= self.buckets.len() {
            self.buckets.resize(priority + 1, None);
        }
        links.set_next_with_same_priority(item, self.buckets[priority]);
        self.buckets[priority] = Some(item);
    }

    /// Извлекает элемент с наименьшим приоритетом.
    pub fn dequeue<L: QueueLinks + ?Sized>(&mut self, links: &L) -> Option<usize> {
        while self.minimum < self.buckets.len() {
            if let Some(item) = self.buckets[self.minimum] {
                self.buckets[self.minimum] = links.next_with_same_priority(item);
                self.count -= 1;
                return Some(item);
            }
            self.minimum += 1;
        }
        None
    }

    /// Уменьшение ключа: переносит `item` из корзины `old_priority` в корзину
    /// его текущего приоритета.
    ///
    /// Возвращает `false` и ничего не меняет, если элемента нет в старой корзине.
    pub fn change<L: QueueLinks + ?Sized>(
        &mut self,
        links: &mut L,
        item: usize,
        old_priority: usize,
    ) -> bool {
        let Some(mut current) = self.buckets.get(old_priority).copied().flatten() else {
            return false;
        };
        if current == item {
            self.buckets[old_priority] = links.next_with_same_priority(item);
        } else {
            loop {
                match links.next_with_same_priority(current) {
                    Some(next) if next == item => break,
                    Some(next) => current = next,
                    None => return false,
                }
            }
            let after = links.next_with_same_priority(item);
            links.set_next_with_same_priority(current, after);
        }
        // enqueue увеличит счётчик, но элемент уже был учтён
        let priority = links.priority(item);
        self.enqueue(links, item, priority);
        self.count -= 1;
        true
    }

    /// Опустошает все корзины. Поля элементов не трогаются.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.count = 0;
        self.minimum = usize::MAX;
    }
}
