use super::*;
use crate::plugin::registry::{PluginLoader, PluginRegistry, StaticLibrary};

fn minimal() -> StaticLibrary {
    StaticLibrary::new("mini")
        .create(|_, _, _| Ok(Box::new(())))
        .render(|_, _| 0)
}

#[test]
fn status_codes_decode() {
    assert_eq!(RenderStatus::from_code(0), RenderStatus::Ok);
    assert_eq!(RenderStatus::from_code(1), RenderStatus::Reinit);
    assert_eq!(RenderStatus::from_code(2), RenderStatus::Done);
    assert_eq!(RenderStatus::from_code(3), RenderStatus::NoPresent);
    assert_eq!(RenderStatus::from_code(42), RenderStatus::Unknown(42));
    assert_eq!(RenderStatus::from_code(-7), RenderStatus::Error(-7));
}

#[test]
fn optional_symbols_may_be_absent() {
    let eps = PluginEntryPoints::resolve(&minimal()).unwrap();
    assert_eq!(eps.library, "mini");
    assert!(eps.init.is_none());
    assert!(eps.destroy.is_none());
    assert!(eps.size_changed.is_none());
    assert!(eps.choose_config.is_none());
    assert!(eps.create_context.is_none());
}

#[test]
fn missing_required_symbol_is_an_error() {
    let no_render = StaticLibrary::new("half").create(|_, _, _| Ok(Box::new(())));
    let err = PluginEntryPoints::resolve(&no_render).unwrap_err();
    assert!(err.to_string().contains("render"));

    let no_create = StaticLibrary::new("half").render(|_, _| 0);
    let err = PluginEntryPoints::resolve(&no_create).unwrap_err();
    assert!(err.to_string().contains("create"));
}

#[test]
fn mismatched_symbol_kind_is_an_error() {
    let render: RenderFn = Arc::new(|_: &mut PluginState, _: &mut dyn RenderContext| 0);
    let lib = minimal().export(SYM_INIT, PluginSymbol::Render(render));
    assert!(PluginEntryPoints::resolve(&lib).is_err());
}

#[test]
fn registry_resolves_paths_to_library_names() {
    let mut reg = PluginRegistry::new();
    reg.register(minimal());
    assert!(reg.open("mini").is_ok());
    assert!(reg.open("/vendor/lib/libmini.so").is_ok());
    assert!(reg.open("other").is_err());
    assert!(PluginRegistry::with_builtins().names().any(|n| n == "pulse"));
}
