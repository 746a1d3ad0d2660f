use darling::{ast, FromMeta};
use proc_macro::TokenStream;
use quote::{format_ident, quote};

#[derive(FromMeta)]
struct RouteArgs {
	#[darling(multiple)]
	tag: Vec<syn::Expr>,
	#[darling(multiple)]
	response: Vec<ResponseArgs>,
	#[darling(multiple)]
	error: Vec<syn::LitInt>,
}

#[derive(FromMeta)]
struct ResponseArgs {
	status: syn::LitInt,
	shape: Option<syn::Type>,
	description: Option<String>,
}

/// Default descriptions for the error statuses rendered by `crate::error::RouteError`.
fn error_description(status: u16) -> Option<&'static str> {
	Some(match status {
		400 => "The request body, path or query failed validation.",
		401 => "No valid session cookie or API key was provided.",
		403 => "The authenticated user lacks the required permission.",
		404 => "The resource does not exist, or its feature is disabled.",
		429 => "Too many requests.",
		_ => return None,
	})
}

pub fn from_input(args: TokenStream, input: TokenStream) -> TokenStream {
	let args = match ast::NestedMeta::parse_meta_list(args.into()) {
		Ok(x) => x,
		Err(e) => return e.into_compile_error().into(),
	};

	let args = match RouteArgs::from_list(&args) {
		Ok(x) => x,
		Err(e) => return e.write_errors().into(),
	};

	let function = syn::parse_macro_input!(input as syn::ItemFn);
	let (summary, description) = match extract_doc_comment(&function) {
		Ok(x) => x,
		Err(e) => return e.into_compile_error().into(),
	};

	let fn_name = format_ident!("{}_docs", function.sig.ident);
	let fn_vis = &function.vis;

	let tags = args.tag.iter();
	let responses = args.response.into_iter().map(|response| {
		let status = response.status;
		let shape = response.shape.map_or_else(|| quote!(()), |x| quote!(#x));

		if let Some(description) = response.description {
			quote! {
				.response_with::<#status, #shape, _>(|res| res.description(#description))
			}
		} else {
			quote! {
				.response::<#status, #shape>()
			}
		}
	});

	let mut errors = Vec::with_capacity(args.error.len());

	for status in &args.error {
		let code = match status.base10_parse::<u16>() {
			Ok(code) => code,
			Err(e) => return e.into_compile_error().into(),
		};

		let Some(description) = error_description(code) else {
			return syn::Error::new_spanned(status, "unsupported error status")
				.into_compile_error()
				.into();
		};

		errors.push(quote! {
			.response_with::<#status, crate::extract::Json<crate::error::ErrorBody>, _>(|res| res.description(#description))
		});
	}

	quote! {
		#function

		#fn_vis fn #fn_name(op: aide::transform::TransformOperation) -> aide::transform::TransformOperation {
			op.description(#description).summary(#summary)
				#(
					.tag(#tags)
				)*
				#(
					#responses
				)*
				#(
					#errors
				)*
		}
	}
	.into()
}

/// Splits the doc comment into a one-line summary and a description.
fn extract_doc_comment(function: &syn::ItemFn) -> syn::Result<(String, String)> {
	let mut doc_lines = String::new();

	for attr in &function.attrs {
		let syn::Meta::NameValue(doc_attr) = &attr.meta else {
			continue;
		};

		if !doc_attr.path.is_ident("doc") {
			continue;
		}

		if let syn::Expr::Lit(syn::ExprLit {
			lit: syn::Lit::Str(literal),
			..
		}) = &doc_attr.value
		{
			doc_lines += literal.value().trim(); // Trim lines like rustdoc does
			doc_lines += "\n";
		}
	}

	let doc_lines = doc_lines.trim().replace("\\\n", "");
	let mut paragraphs = doc_lines.splitn(2, '\n').filter(|x| !x.is_empty());

	let summary = paragraphs.next().map(|x| x.replace('\n', " ")).ok_or_else(|| {
		syn::Error::new_spanned(&function.sig.ident, "missing summary line in doc comment")
	})?;
	let description = paragraphs.next().map(ToOwned::to_owned).ok_or_else(|| {
		syn::Error::new_spanned(&function.sig.ident, "missing description in doc comment")
	})?;

	Ok((summary, description))
}
