use mcx_syntax::{DefinitionLocation, escape, packed::ResourceLocation};

/// `a/b::name` lives at `<namespace>:a/b/<escaped name>`.
pub fn pack_location(namespace: &str, name: &DefinitionLocation) -> ResourceLocation {
    let mut parts = name.module.0.clone();
    parts.push(escape(&name.name));
    ResourceLocation::new(namespace, parts.join("/"))
}
