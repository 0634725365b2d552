mod component;

use proc_macro::TokenStream;
use syn::DeriveInput;

/// Implements `strata_ecs::components::Component` for a struct with named fields.
///
/// The struct must have exactly one field holding the `ComponentBase`: either the field
/// marked `#[component(base)]` or the only field whose type is named `ComponentBase`.
/// Every other field must implement [Default].
#[proc_macro_derive(Component, attributes(component))]
pub fn derive_component(input: TokenStream) -> TokenStream {
	let ast = syn::parse_macro_input!(input as DeriveInput);
	match component::impl_component(&ast) {
		Ok(tokens) => tokens.into(),
		Err(error) => error.to_compile_error().into(),
	}
}
