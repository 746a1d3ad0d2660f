use std::{
	collections::HashSet,
	sync::{Mutex, PoisonError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalId {
	TransferVehicle,
}

/// Which modals are open.
#[derive(Debug, Default)]
pub struct Modals {
	open: Mutex<HashSet<ModalId>>,
}

impl Modals {
	pub fn open(&self, id: ModalId) {
		self.open.lock().unwrap_or_else(PoisonError::into_inner).insert(id);
	}

	pub fn close(&self, id: ModalId) {
		self.open.lock().unwrap_or_else(PoisonError::into_inner).remove(&id);
	}

	pub fn is_open(&self, id: ModalId) -> bool {
		self.open.lock().unwrap_or_else(PoisonError::into_inner).contains(&id)
	}
}
