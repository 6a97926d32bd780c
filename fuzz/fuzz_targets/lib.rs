use lincache::{
    Policy,
    Touch,
};

#[derive(Debug)]
pub enum CacheOperation {
    Set(u8, u8, Touch),
    Get(u8, Touch),
    Peek(u8),
    Remove(u8),
    Shift,
    Clear,
    Iter,
    SetLimit(u8),
    SetRatio(u8),
}

fn arbitrary_touch(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Touch> {
    Ok(match u.int_in_range(0..=2)? {
        0 => Touch::None,
        1 => Touch::AsOld,
        _ => Touch::AsNew,
    })
}

impl<'a> arbitrary::Arbitrary<'a> for CacheOperation {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        match u.int_in_range(0..=8)? {
            0 => Ok(CacheOperation::Set(
                u.arbitrary()?,
                u.arbitrary()?,
                arbitrary_touch(u)?,
            )),
            1 => Ok(CacheOperation::Get(u.arbitrary()?, arbitrary_touch(u)?)),
            2 => Ok(CacheOperation::Peek(u.arbitrary()?)),
            3 => Ok(CacheOperation::Remove(u.arbitrary()?)),
            4 => Ok(CacheOperation::Shift),
            5 => Ok(CacheOperation::Clear),
            6 => Ok(CacheOperation::Iter),
            7 => Ok(CacheOperation::SetLimit(u.arbitrary()?)),
            8 => Ok(CacheOperation::SetRatio(u.arbitrary()?)),
            _ => unreachable!(),
        }
    }
}

/// Reference cache kept as a plain vector ordered from old to new.
#[derive(Debug)]
pub struct Model {
    pub entries: Vec<(u8, u8)>,
    pub limit: usize,
    pub ratio: f64,
    pub policy: Policy,
}

impl Model {
    pub fn new(limit: usize, ratio: f64, policy: Policy) -> Self {
        Self {
            entries: Vec::new(),
            limit,
            ratio,
            policy,
        }
    }

    fn position(&self, key: u8) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    fn target(&self) -> usize {
        ((self.limit as f64 * self.ratio).round() as usize).min(self.limit)
    }

    fn move_to(&mut self, index: usize, touch: Touch) -> usize {
        match touch {
            Touch::None => index,
            Touch::AsOld => {
                let entry = self.entries.remove(index);
                self.entries.insert(0, entry);
                0
            }
            Touch::AsNew => {
                let entry = self.entries.remove(index);
                self.entries.push(entry);
                self.entries.len() - 1
            }
        }
    }

    pub fn trim(&mut self) {
        if self.entries.len() <= self.limit {
            return;
        }
        let target = self.target();
        match self.policy {
            Policy::Lru => {
                let excess = self.entries.len() - target;
                self.entries.drain(..excess);
            }
            Policy::Mru => self.entries.truncate(target),
        }
    }

    pub fn set(&mut self, key: u8, value: u8, touch: Touch) -> Option<u8> {
        if self.policy == Policy::Mru
            && self.entries.len() >= self.limit
            && self.position(key).is_none()
        {
            self.entries.truncate(self.target().saturating_sub(1));
        }

        let previous = match self.position(key) {
            Some(index) => {
                let previous = std::mem::replace(&mut self.entries[index].1, value);
                self.move_to(index, touch);
                Some(previous)
            }
            None => {
                match touch {
                    Touch::AsOld => self.entries.insert(0, (key, value)),
                    Touch::None | Touch::AsNew => self.entries.push((key, value)),
                }
                None
            }
        };
        self.trim();
        previous
    }

    pub fn get(&mut self, key: u8, touch: Touch) -> Option<u8> {
        let index = self.position(key)?;
        let index = self.move_to(index, touch);
        Some(self.entries[index].1)
    }

    pub fn peek(&self, key: u8) -> Option<u8> {
        self.position(key).map(|index| self.entries[index].1)
    }

    pub fn remove(&mut self, key: u8) -> Option<u8> {
        let index = self.position(key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn shift(&mut self) -> Option<(u8, u8)> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }
}
