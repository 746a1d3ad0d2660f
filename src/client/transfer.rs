//! The transfer vehicle modal.

use axum::http::Method;
use uuid::Uuid;

use super::{
	form::FormState,
	modal::ModalId,
	shared,
	transport::Request,
	ClientContext, Error,
};
use crate::route::vehicle::model::{TransferVehicleInput, Vehicle};

pub type OnTransfer = Box<dyn FnMut(&Vehicle) + Send>;

/// Hands a vehicle over to another citizen.
pub struct TransferVehicleForm {
	vehicle: Vehicle,
	pub form: FormState<TransferVehicleInput>,
	on_transfer: OnTransfer,
}

impl TransferVehicleForm {
	pub fn new(vehicle: Vehicle, on_transfer: impl FnMut(&Vehicle) + Send + 'static) -> Self {
		Self {
			vehicle,
			form: FormState::new(TransferVehicleInput::default()),
			on_transfer: Box::new(on_transfer),
		}
	}

	pub fn vehicle(&self) -> &Vehicle {
		&self.vehicle
	}

	/// Picks the new owner.
	pub fn select_owner(&mut self, id: Uuid, name: &str) -> Result<(), Error> {
		self.form.set_field("ownerId", serde_json::json!(id))?;
		self.form.set_field("name", serde_json::json!(name))
	}

	/// Sends the transfer. On success the response is merged over the known
	/// vehicle, the callback sees the result and the modal closes.
	pub async fn submit(&mut self, context: &ClientContext) -> Result<Vehicle, Error> {
		if !self.form.validate() {
			return Err(Error::Invalid);
		}

		let body = self.form.to_json()?;
		let response = context
			.fetch()
			.execute_with(
				Request::json(
					Method::POST,
					format!("/vehicles/transfer/{}", self.vehicle.id),
					body,
				),
				Some(&mut self.form),
			)
			.await?;

		let merged = shared::merge(&serde_json::to_value(&self.vehicle)?, &response);

		self.vehicle = serde_json::from_value(merged)?;
		(self.on_transfer)(&self.vehicle);

		context.modals.close(ModalId::TransferVehicle);
		context
			.toasts
			.success("Transferred", format!("{} has a new owner", self.vehicle.plate));

		Ok(self.vehicle.clone())
	}
}
