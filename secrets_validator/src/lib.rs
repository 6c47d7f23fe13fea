extern crate proc_macro;

use quote::quote;

#[proc_macro]
pub fn check_env(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    check_env_inner(input.into()).into()
}

fn check_env_inner(_input: proc_macro2::TokenStream) -> proc_macro2::TokenStream {
    for key in ["DATABASE_URL", "JWT_SECRET"] {
        if dotenvy::var(key).is_err() {
            let msg = format!("{key} not set");
            return quote! {compile_error!(#msg);};
        }
    }

    quote! {}
}
