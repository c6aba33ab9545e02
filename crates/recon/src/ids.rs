use uuid::Uuid;

/// Supplies the identifier stamped on each output record.
pub trait IdSource {
    fn next_id(&mut self) -> Uuid;
}

/// Random v4 identifiers. Used for every production run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Counter-backed identifiers for reproducible output (tests, golden files).
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> Uuid {
        self.next += 1;
        Uuid::from_u128(self.next)
    }
}
