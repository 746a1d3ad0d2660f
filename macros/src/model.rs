use darling::{ast, FromDeriveInput, FromField};
use quote::{format_ident, quote};

/// Marks a field as server-owned.
const READONLY: &str = "readonly";

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named), forward_attrs)]
struct ModelInputReceiver {
	ident: syn::Ident,

	generics: syn::Generics,

	data: ast::Data<(), ModelFieldReceiver>,

	attrs: Vec<syn::Attribute>,
}

#[derive(Debug, FromField)]
#[darling(forward_attrs)]
struct ModelFieldReceiver {
	ident: Option<syn::Ident>,

	ty: syn::Type,
	vis: syn::Visibility,

	attrs: Vec<syn::Attribute>,
}

fn is_readonly(attrs: &[syn::Attribute]) -> bool {
	attrs.iter().any(|attr| attr.path().is_ident(READONLY))
}

/// Removes the `#[readonly]` marker so the model itself compiles.
fn strip_readonly(input: &mut syn::DeriveInput) {
	if let syn::Data::Struct(ref mut data) = input.data {
		for field in &mut data.fields {
			field.attrs.retain(|attr| !attr.path().is_ident(READONLY));
		}
	}
}

pub fn from_input(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let mut input = syn::parse_macro_input!(input as syn::DeriveInput);
	let receiver = match ModelInputReceiver::from_derive_input(&input) {
		Ok(x) => x,
		Err(e) => return e.write_errors().into(),
	};

	strip_readonly(&mut input);

	let ident = &receiver.ident;
	let vis = &input.vis;
	let generics = &receiver.generics;
	let input_ident = format_ident!("{}Input", ident);
	let doc = format!(" The client-writable fields of [`{ident}`].");

	// Container docs describe the model, not the input
	let attrs = receiver
		.attrs
		.iter()
		.filter(|attr| !attr.path().is_ident("doc"))
		.collect::<Vec<_>>();

	let Some(fields) = receiver.data.take_struct() else {
		return syn::Error::new_spanned(ident, "#[model] only supports structs")
			.into_compile_error()
			.into();
	};

	let fields = fields
		.iter()
		.filter(|field| !is_readonly(&field.attrs))
		.filter_map(|field| {
			let ident = field.ident.as_ref()?;
			let ty = &field.ty;
			let attrs = &field.attrs;
			let vis = &field.vis;

			Some(quote! {
				#(#attrs)*
				#vis #ident: #ty,
			})
		})
		.collect::<Vec<_>>();

	quote! {
		#input

		#[doc = #doc]
		#(#attrs)*
		#vis struct #input_ident #generics {
			#(
				#fields
			)*
		}
	}
	.into()
}
