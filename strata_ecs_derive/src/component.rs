use proc_macro2::TokenStream;
use syn::{Data, DeriveInput, Error, Field, Fields, Type};
use quote::quote;

pub fn impl_component(ast: &DeriveInput) -> Result<TokenStream, Error> {
	let name = &ast.ident;
	let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

	let fields = match &ast.data {
		Data::Struct(data) => match &data.fields {
			Fields::Named(fields) => &fields.named,
			_ => return Err(Error::new_spanned(name, "Component can only be derived for structs with named fields")),
		},
		_ => return Err(Error::new_spanned(name, "Component can only be derived for structs")),
	};

	let base = find_base(fields.iter())?.ok_or_else(|| {
		Error::new_spanned(
			name,
			"Component needs a field of type ComponentBase, or a field marked #[component(base)]",
		)
	})?;
	let base_ident = &base.ident;

	let init = fields.iter().map(|field| {
		let ident = &field.ident;
		if field.ident == base.ident {
			quote! { #ident: base }
		} else {
			quote! { #ident: ::core::default::Default::default() }
		}
	});

	Ok(quote! {
		impl #impl_generics ::strata_ecs::components::Component for #name #ty_generics #where_clause {
			fn from_base(base: ::strata_ecs::components::ComponentBase) -> Self {
				Self { #(#init),* }
			}

			#[inline(always)]
			fn base(&self) -> &::strata_ecs::components::ComponentBase {
				&self.#base_ident
			}

			#[inline(always)]
			fn base_mut(&mut self) -> &mut ::strata_ecs::components::ComponentBase {
				&mut self.#base_ident
			}
		}
	})
}

fn find_base<'l>(fields: impl Iterator<Item = &'l Field> + Clone) -> Result<Option<&'l Field>, Error> {
	let mut marked = None;
	for field in fields.clone() {
		if is_marked_base(field)? {
			if marked.is_some() {
				return Err(Error::new_spanned(field, "Only one field can be marked #[component(base)]"));
			}
			marked = Some(field);
		}
	}
	if marked.is_some() {
		return Ok(marked);
	}

	let mut typed = fields.filter(|field| is_base_type(&field.ty));
	let first = typed.next();
	if let Some(second) = typed.next() {
		return Err(Error::new_spanned(
			second,
			"Several fields have type ComponentBase, mark the right one with #[component(base)]",
		));
	}
	Ok(first)
}

fn is_marked_base(field: &Field) -> Result<bool, Error> {
	let mut marked = false;
	for attr in field.attrs.iter().filter(|attr| attr.path.is_ident("component")) {
		let ident: syn::Ident = attr.parse_args()?;
		if ident != "base" {
			return Err(Error::new_spanned(ident, "Expected #[component(base)]"));
		}
		marked = true;
	}
	Ok(marked)
}

fn is_base_type(ty: &Type) -> bool {
	match ty {
		Type::Path(path) => path
			.path
			.segments
			.last()
			.map_or(false, |segment| segment.ident == "ComponentBase"),
		_ => false,
	}
}
