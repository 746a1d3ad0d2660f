mod model;
mod route;

use proc_macro::TokenStream;

/// Creates a documentation function for the route, named after the original function with the suffix `_docs`.
///
/// The first line of the doc comment becomes the summary, the rest becomes the description.
/// Every `error = N` argument documents an error response rendered by `crate::error`.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}

/// Creates a new struct `XInput` holding the client-writable fields of the model.
///
/// Fields marked with `#[readonly]` are owned by the server (ids, owners, timestamps)
/// and are left out of the input. All other fields are copied verbatim, including their
/// `serde` and `validate` attributes, so the input validates exactly like the model.
#[proc_macro_attribute]
pub fn model(_args: TokenStream, input: TokenStream) -> TokenStream {
	model::from_input(input)
}
