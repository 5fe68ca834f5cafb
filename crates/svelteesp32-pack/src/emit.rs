//! Rust source generation.
//!
//! The generated module is meant to be pulled in with
//! `include!(concat!(env!("OUT_DIR"), "/svelteesp32.rs"))`. It only names
//! items through absolute paths (`::svelteesp32_core::...`), so it can be
//! included inside any module of the consuming crate.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;

use svelteesp32_core::Backend;

use crate::asset::PackedAsset;
use crate::classify::{dataname, extension_counts};
use crate::config::{PackConfig, Toggle};
use crate::error::EmitError;

const CORE: &str = "::svelteesp32_core";
const BYTES_PER_LINE: usize = 16;

/// Numbers the generated module exposes, also used for the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub count: usize,
    /// Sum of original sizes.
    pub size: usize,
    /// Sum of stored sizes with gzip in effect.
    pub size_gzip: usize,
    pub handler_count: usize,
    pub css_files: usize,
}

impl Totals {
    pub fn of(assets: &[PackedAsset], config: &PackConfig) -> Self {
        let has_entry = assets.iter().any(|asset| asset.entry);
        let gzip_active = config.gzip.is_possible();
        Self {
            count: assets.len(),
            size: assets.iter().map(PackedAsset::original_len).sum(),
            size_gzip: assets.iter().map(|asset| asset.stored(gzip_active).len()).sum(),
            handler_count: assets.len()
                + usize::from(has_entry)
                + if has_entry && config.spa_fallback {
                    config.engine.fallback_handlers()
                } else {
                    0
                },
            css_files: assets.iter().filter(|asset| asset.is_css()).count(),
        }
    }
}

/// Generate the module source for `assets`.
pub fn emit(assets: &[PackedAsset], config: &PackConfig, created: Option<&str>) -> Result<String, EmitError> {
    let emitter = Emitter {
        assets,
        config,
        prefix: &config.define,
        totals: Totals::of(assets, config),
    };
    let source = emitter.render(created)?;
    verify_contract(assets, config, &source)?;
    Ok(source)
}

struct Emitter<'a> {
    assets: &'a [PackedAsset],
    config: &'a PackConfig,
    prefix: &'a str,
    totals: Totals,
}

impl Emitter<'_> {
    fn render(&self, created: Option<&str>) -> Result<String, EmitError> {
        let mut out = String::with_capacity(self.estimated_len());
        self.header(&mut out, created)?;
        self.constants(&mut out)?;
        self.data(&mut out)?;
        self.table(&mut out)?;
        self.registration(&mut out)?;
        Ok(out)
    }

    fn estimated_len(&self) -> usize {
        // ~6 source bytes per embedded byte ("0x00, ")
        let stored: usize = self
            .assets
            .iter()
            .map(|asset| asset.original_len() + asset.gzip.as_ref().map_or(0, Vec::len))
            .sum();
        stored * 6 + 4096
    }

    fn header(&self, out: &mut String, created: Option<&str>) -> Result<(), EmitError> {
        writeln!(out, "// @generated by svelteesp32-pack {}. Do not edit.", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "//")?;
        writeln!(out, "// engine:   {}", self.config.engine)?;
        if let Some(command_line) = &self.config.command_line {
            writeln!(out, "// cmdline:  {}", command_line.replace('\n', " "))?;
        }
        if let Some(created) = created {
            writeln!(out, "// created:  {created}")?;
        }
        writeln!(out, "// etag:     {}", toggle_name(self.config.etag))?;
        writeln!(out, "// gzip:     {}", toggle_name(self.config.gzip))?;
        if self.config.etag == Toggle::Compiler || self.config.gzip == Toggle::Compiler {
            writeln!(out, "//")?;
            writeln!(
                out,
                "// compiler-mode options follow the consumer's cargo features: {}, {}",
                self.config.feature_name("etag"),
                self.config.feature_name("gzip")
            )?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn constants(&self, out: &mut String) -> Result<(), EmitError> {
        let p = self.prefix;
        let totals = &self.totals;

        if let Some(version) = &self.config.version {
            writeln!(out, "pub const {p}_VERSION: &str = {version:?};")?;
        }
        writeln!(out, "pub const {p}_COUNT: usize = {};", totals.count)?;
        writeln!(out, "pub const {p}_SIZE: usize = {};", totals.size)?;
        writeln!(out, "pub const {p}_SIZE_GZIP: usize = {};", totals.size_gzip)?;
        writeln!(out, "pub const {p}_HANDLER_COUNT: usize = {};", totals.handler_count)?;
        writeln!(
            out,
            "pub const {p}_ENTRY_DOCUMENT: bool = {};",
            self.assets.iter().any(|asset| asset.entry)
        )?;
        writeln!(out, "pub const {p}_ENABLE_GZIP: bool = {};", self.switch(self.config.gzip, "gzip"))?;
        writeln!(out, "pub const {p}_ENABLE_ETAG: bool = {};", self.switch(self.config.etag, "etag"))?;
        writeln!(out)?;

        for asset in self.assets {
            writeln!(out, "pub const {p}_FILE_{}: bool = true;", asset.dataname)?;
        }
        writeln!(out)?;

        for (extension, count) in self.extension_constants() {
            writeln!(out, "pub const {p}_{extension}_FILES: usize = {count};")?;
        }
        writeln!(out)?;
        Ok(())
    }

    /// Per-extension counts keyed by constant stem. `CSS` is always present.
    fn extension_constants(&self) -> BTreeMap<String, usize> {
        let mut constants = BTreeMap::from([("CSS".to_string(), 0)]);
        for (extension, count) in extension_counts(self.assets) {
            if extension.is_empty() {
                continue;
            }
            *constants.entry(dataname(&extension)).or_insert(0) += count;
        }
        constants
    }

    fn switch(&self, toggle: Toggle, option: &str) -> String {
        match toggle {
            Toggle::On => "true".to_string(),
            Toggle::Off => "false".to_string(),
            Toggle::Compiler => format!("cfg!(feature = {:?})", self.config.feature_name(option)),
        }
    }

    fn data(&self, out: &mut String) -> Result<(), EmitError> {
        for asset in self.assets {
            let gzip = asset.gzip.as_deref();
            let identity_needed = match self.config.gzip {
                Toggle::On => gzip.is_none(),
                Toggle::Off | Toggle::Compiler => true,
            };
            if identity_needed {
                write_bytes(out, &format!("DATA_{}", asset.dataname), &asset.original)?;
            }
            if let Some(gzip) = gzip.filter(|_| self.config.gzip.is_possible()) {
                write_bytes(out, &format!("DATAGZIP_{}", asset.dataname), gzip)?;
            }
        }
        Ok(())
    }

    fn table(&self, out: &mut String) -> Result<(), EmitError> {
        let p = self.prefix;

        writeln!(out, "const {p}_ASSET_LIST: &[{CORE}::Asset] = &[")?;
        for asset in self.assets {
            self.asset_literal(out, asset)?;
        }
        writeln!(out, "];")?;
        writeln!(out)?;

        writeln!(out, "pub static {p}_ASSETS: {CORE}::AssetTable = {CORE}::AssetTable::new(")?;
        writeln!(out, "    {p}_ASSET_LIST,")?;
        writeln!(out, "    {CORE}::ServeOptions {{")?;
        writeln!(out, "        root_path: {:?},", format!("{}/", self.config.base_path))?;
        writeln!(out, "        cache_control: {},", self.cache_control())?;
        writeln!(out, "        spa_fallback: {},", self.config.spa_fallback)?;
        writeln!(out, "    }},")?;
        writeln!(out, ");")?;
        writeln!(out)?;

        writeln!(out, "const _: () = assert!({p}_ASSET_LIST.len() == {p}_COUNT);")?;
        writeln!(out, "const _: () = assert!({p}_CSS_FILES <= {});", self.config.max_css)?;
        writeln!(out)?;
        Ok(())
    }

    fn asset_literal(&self, out: &mut String, asset: &PackedAsset) -> Result<(), EmitError> {
        let name = &asset.dataname;
        let gzip = self.config.gzip;
        let compressed = asset.gzip.is_some() && gzip.is_possible();

        let (encoding, data) = match (compressed, gzip) {
            (true, Toggle::Compiler) => (
                format!(
                    "if {}_ENABLE_GZIP {{ {CORE}::Encoding::Gzip }} else {{ {CORE}::Encoding::Identity }}",
                    self.prefix
                ),
                format!("if {}_ENABLE_GZIP {{ DATAGZIP_{name} }} else {{ DATA_{name} }}", self.prefix),
            ),
            (true, _) => (format!("{CORE}::Encoding::Gzip"), format!("DATAGZIP_{name}")),
            (false, _) => (format!("{CORE}::Encoding::Identity"), format!("DATA_{name}")),
        };

        writeln!(out, "    {CORE}::Asset {{")?;
        writeln!(out, "        path: {:?},", asset.path)?;
        writeln!(out, "        mime: {:?},", asset.mime)?;
        writeln!(out, "        encoding: {encoding},")?;
        writeln!(out, "        original_len: {},", asset.original_len())?;
        writeln!(out, "        etag: {},", self.etag(asset, compressed))?;
        writeln!(out, "        entry: {},", asset.entry)?;
        writeln!(out, "        data: {data},")?;
        writeln!(out, "    }},")?;
        Ok(())
    }

    /// The validator follows the representation actually served.
    fn etag(&self, asset: &PackedAsset, compressed: bool) -> String {
        let identity = asset.etag.as_deref().unwrap_or_default();
        let served = match (compressed, asset.gzip_etag.as_deref(), self.config.gzip) {
            (true, Some(gzip), Toggle::Compiler) => format!(
                "if {}_ENABLE_GZIP {{ Some({gzip:?}) }} else {{ Some({identity:?}) }}",
                self.prefix
            ),
            (true, Some(gzip), _) => format!("Some({gzip:?})"),
            _ => format!("Some({identity:?})"),
        };
        match self.config.etag {
            Toggle::On => served,
            Toggle::Off => "None".to_string(),
            Toggle::Compiler => format!("if {}_ENABLE_ETAG {{ {served} }} else {{ None }}", self.prefix),
        }
    }

    fn cache_control(&self) -> String {
        if self.config.cache_time > 0 {
            return format!("Some({:?})", format!("max-age={}", self.config.cache_time));
        }
        match self.config.etag {
            Toggle::On => "Some(\"no-cache\")".to_string(),
            Toggle::Off => "None".to_string(),
            Toggle::Compiler => format!(
                "if {}_ENABLE_ETAG {{ Some(\"no-cache\") }} else {{ None }}",
                self.prefix
            ),
        }
    }

    fn registration(&self, out: &mut String) -> Result<(), EmitError> {
        let p = self.prefix;
        let method = &self.config.method_name;
        let error = format!("{CORE}::RegistrationError");

        match self.config.engine {
            Backend::Async => {
                writeln!(out, "/// Add a route for every embedded file to `router`.")?;
                writeln!(out, "pub fn {method}<S>(")?;
                writeln!(out, "    router: ::svelteesp32_web::axum::Router<S>,")?;
                writeln!(out, ") -> ::core::result::Result<::svelteesp32_web::axum::Router<S>, {error}>")?;
                writeln!(out, "where")?;
                writeln!(
                    out,
                    "    S: ::core::clone::Clone + ::core::marker::Send + ::core::marker::Sync + 'static,"
                )?;
                writeln!(out, "{{")?;
                writeln!(out, "    ::svelteesp32_web::register(router, &{p}_ASSETS)")?;
                writeln!(out, "}}")?;
            }
            Backend::Pool => {
                writeln!(out, "/// Add a route for every embedded file to `server`.")?;
                writeln!(out, "pub fn {method}(")?;
                writeln!(out, "    server: &mut ::svelteesp32_server::PoolServer,")?;
                writeln!(out, ") -> ::core::result::Result<usize, {error}> {{")?;
                writeln!(out, "    ::svelteesp32_server::register(server, &{p}_ASSETS)")?;
                writeln!(out, "}}")?;
            }
            Backend::Espidf => {
                writeln!(out, "/// Add a URI handler for every embedded file to `server`.")?;
                writeln!(out, "///")?;
                writeln!(
                    out,
                    "/// `config.max_uri_handlers` must leave room for {p}_HANDLER_COUNT handlers"
                )?;
                writeln!(out, "/// next to the `handlers_in_use` already registered on `server`.")?;
                writeln!(out, "pub fn {method}<'a>(")?;
                writeln!(out, "    server: &mut ::svelteesp32_esp32::EspHttpServer<'a>,")?;
                writeln!(out, "    config: &::svelteesp32_esp32::Configuration,")?;
                writeln!(out, "    handlers_in_use: usize,")?;
                writeln!(out, ") -> ::core::result::Result<usize, {error}> {{")?;
                writeln!(
                    out,
                    "    ::svelteesp32_esp32::register(server, config, handlers_in_use, &{p}_ASSETS)"
                )?;
                writeln!(out, "}}")?;
            }
        }
        Ok(())
    }
}

fn toggle_name(toggle: Toggle) -> &'static str {
    match toggle {
        Toggle::On => "true",
        Toggle::Off => "false",
        Toggle::Compiler => "compiler",
    }
}

fn write_bytes(out: &mut String, name: &str, bytes: &[u8]) -> Result<(), EmitError> {
    if bytes.is_empty() {
        writeln!(out, "const {name}: &[u8] = &[];")?;
        return Ok(());
    }
    writeln!(out, "const {name}: &[u8] = &[")?;
    for chunk in bytes.chunks(BYTES_PER_LINE) {
        out.push_str("   ");
        for byte in chunk {
            write!(out, " 0x{byte:02x},")?;
        }
        out.push('\n');
    }
    writeln!(out, "];")?;
    Ok(())
}

/// Re-check the invariants the generated table promises.
fn verify_contract(assets: &[PackedAsset], config: &PackConfig, source: &str) -> Result<(), EmitError> {
    let mut paths = HashSet::new();
    let mut datanames = HashSet::new();
    for asset in assets {
        if !asset.path.starts_with('/') {
            return Err(EmitError::Contract(format!("path does not start with '/': {}", asset.path)));
        }
        if !paths.insert(asset.path.as_str()) {
            return Err(EmitError::Contract(format!("duplicate path: {}", asset.path)));
        }
        if !datanames.insert(asset.dataname.as_str()) {
            return Err(EmitError::Contract(format!("duplicate identifier: {}", asset.dataname)));
        }
        if let Some(gzip) = &asset.gzip {
            if gzip.len() >= asset.original_len() {
                return Err(EmitError::Contract(format!(
                    "compressed form of {} is not smaller than the original",
                    asset.path
                )));
            }
        }
        if config.etag.is_possible() && asset.etag.is_none() {
            return Err(EmitError::Contract(format!("missing fingerprint for {}", asset.path)));
        }
    }

    let entries = assets.iter().filter(|asset| asset.entry).count();
    if entries > 1 {
        return Err(EmitError::Contract(format!("{entries} entry documents")));
    }
    let css = assets.iter().filter(|asset| asset.is_css()).count();
    if css > config.max_css {
        return Err(EmitError::Contract(format!("{css} CSS files, at most {} allowed", config.max_css)));
    }

    let count_line = format!("pub const {}_COUNT: usize = {};", config.define, assets.len());
    if !source.contains(&count_line) {
        return Err(EmitError::Contract(format!("missing '{count_line}'")));
    }
    let entry_point = format!("pub fn {}", config.method_name);
    if !source.contains(&entry_point) {
        return Err(EmitError::Contract(format!("missing registration function {}", config.method_name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::tests::asset;
    use crate::fingerprint::fingerprint_assets;
    use pretty_assertions::assert_eq;

    fn bundle() -> Vec<PackedAsset> {
        let mut assets = vec![
            PackedAsset {
                path: "/assets/app.css".to_string(),
                mime: "text/css",
                compressible: true,
                gzip: Some(vec![0x1f, 0x8b, 0x08]),
                ..asset("assets/app.css", b"body { color: red }")
            },
            PackedAsset {
                mime: "text/html",
                entry: true,
                ..asset("index.html", b"<html>")
            },
        ];
        fingerprint_assets(&mut assets);
        assets
    }

    fn config(engine: Backend) -> PackConfig {
        PackConfig::new("dist", engine)
    }

    #[test]
    fn test_constants() {
        let source = emit(&bundle(), &config(Backend::Async), None).unwrap();

        assert!(source.contains("pub const SVELTEESP32_COUNT: usize = 2;"));
        assert!(source.contains("pub const SVELTEESP32_SIZE: usize = 25;"));
        assert!(source.contains("pub const SVELTEESP32_SIZE_GZIP: usize = 9;"));
        assert!(source.contains("pub const SVELTEESP32_HANDLER_COUNT: usize = 4;"));
        assert!(source.contains("pub const SVELTEESP32_ENTRY_DOCUMENT: bool = true;"));
        assert!(source.contains("pub const SVELTEESP32_FILE_INDEX_HTML: bool = true;"));
        assert!(source.contains("pub const SVELTEESP32_FILE_ASSETS_APP_CSS: bool = true;"));
        assert!(source.contains("pub const SVELTEESP32_CSS_FILES: usize = 1;"));
        assert!(source.contains("pub const SVELTEESP32_HTML_FILES: usize = 1;"));
        assert!(!source.contains("SVELTEESP32_VERSION"));
    }

    #[test]
    fn test_css_constant_always_present() {
        let assets = vec![PackedAsset {
            entry: true,
            ..asset("index.html", b"<html>")
        }];
        let source = emit(&assets, &config(Backend::Pool), None).unwrap();
        assert!(source.contains("pub const SVELTEESP32_CSS_FILES: usize = 0;"));
    }

    #[test]
    fn test_data_and_table_with_gzip_on() {
        let source = emit(&bundle(), &config(Backend::Async), None).unwrap();

        assert!(source.contains("const DATAGZIP_ASSETS_APP_CSS: &[u8] = &[\n    0x1f, 0x8b, 0x08,\n];"));
        assert!(!source.contains("const DATA_ASSETS_APP_CSS"));
        assert!(source.contains("const DATA_INDEX_HTML: &[u8] = &["));
        assert!(source.contains("encoding: ::svelteesp32_core::Encoding::Gzip,"));
        assert!(source.contains("data: DATAGZIP_ASSETS_APP_CSS,"));
        assert!(source.contains("original_len: 19,"));
        assert!(source.contains("path: \"/index.html\","));
        assert!(source.contains("root_path: \"/\","));
        assert!(source.contains("etag: None,"));
        assert!(source.contains("cache_control: None,"));
        assert!(source.contains("const _: () = assert!(SVELTEESP32_ASSET_LIST.len() == SVELTEESP32_COUNT);"));
        assert!(source.contains("const _: () = assert!(SVELTEESP32_CSS_FILES <= 1);"));
    }

    #[test]
    fn test_gzip_off_keeps_identity() {
        let mut config = config(Backend::Async);
        config.gzip = Toggle::Off;
        let source = emit(&bundle(), &config, None).unwrap();

        assert!(source.contains("pub const SVELTEESP32_ENABLE_GZIP: bool = false;"));
        assert!(source.contains("pub const SVELTEESP32_SIZE_GZIP: usize = 25;"));
        assert!(!source.contains("DATAGZIP_"));
        assert!(!source.contains("Encoding::Gzip"));
    }

    #[test]
    fn test_compiler_mode_uses_features() {
        let mut config = config(Backend::Async);
        config.gzip = Toggle::Compiler;
        config.etag = Toggle::Compiler;
        let source = emit(&bundle(), &config, None).unwrap();

        assert!(source.contains("pub const SVELTEESP32_ENABLE_GZIP: bool = cfg!(feature = \"svelteesp32-gzip\");"));
        assert!(source.contains("pub const SVELTEESP32_ENABLE_ETAG: bool = cfg!(feature = \"svelteesp32-etag\");"));
        assert!(source.contains("const DATA_ASSETS_APP_CSS: &[u8]"));
        assert!(source.contains("const DATAGZIP_ASSETS_APP_CSS: &[u8]"));
        assert!(source.contains("data: if SVELTEESP32_ENABLE_GZIP { DATAGZIP_ASSETS_APP_CSS } else { DATA_ASSETS_APP_CSS },"));
        assert!(source.contains("cache_control: if SVELTEESP32_ENABLE_ETAG { Some(\"no-cache\") } else { None },"));
    }

    #[test]
    fn test_etag_and_cache_control() {
        let assets = bundle();
        let mut config = config(Backend::Pool);
        config.etag = Toggle::On;
        let source = emit(&assets, &config, None).unwrap();

        let gzip_etag = assets[0].gzip_etag.as_deref().unwrap();
        assert!(source.contains(&format!("etag: Some({gzip_etag:?}),")));
        assert!(source.contains("cache_control: Some(\"no-cache\"),"));

        config.cache_time = 3600;
        let source = emit(&assets, &config, None).unwrap();
        assert!(source.contains("cache_control: Some(\"max-age=3600\"),"));
    }

    #[test]
    fn test_base_path_and_version() {
        let mut assets = bundle();
        for asset in &mut assets {
            asset.path = format!("/ui{}", asset.path);
        }
        let mut config = config(Backend::Async);
        config.base_path = "/ui".to_string();
        config.version = Some("v1.2.3".to_string());
        config.spa_fallback = false;
        let source = emit(&assets, &config, None).unwrap();

        assert!(source.contains("root_path: \"/ui/\","));
        assert!(source.contains("spa_fallback: false,"));
        assert!(source.contains("pub const SVELTEESP32_VERSION: &str = \"v1.2.3\";"));
        assert!(source.contains("pub const SVELTEESP32_HANDLER_COUNT: usize = 3;"));
    }

    #[test]
    fn test_registration_per_backend() {
        let assets = bundle();

        let source = emit(&assets, &config(Backend::Async), None).unwrap();
        assert!(source.contains("pub fn init_svelte_static_files<S>("));
        assert!(source.contains("::svelteesp32_web::register(router, &SVELTEESP32_ASSETS)"));

        let source = emit(&assets, &config(Backend::Pool), None).unwrap();
        assert!(source.contains("server: &mut ::svelteesp32_server::PoolServer,"));
        assert!(source.contains("::svelteesp32_server::register(server, &SVELTEESP32_ASSETS)"));

        let mut espidf = config(Backend::Espidf);
        espidf.method_name = "init_web".to_string();
        espidf.define = "WEB".to_string();
        let source = emit(&assets, &espidf, None).unwrap();
        assert!(source.contains("pub fn init_web<'a>("));
        assert!(source.contains("    handlers_in_use: usize,\n"));
        assert!(source.contains("::svelteesp32_esp32::register(server, config, handlers_in_use, &WEB_ASSETS)"));
        assert!(source.contains("pub const WEB_COUNT: usize = 2;"));
        // two files, the root alias and one wildcard per method
        assert!(source.contains("pub const WEB_HANDLER_COUNT: usize = 10;"));
    }

    #[test]
    fn test_header() {
        let mut config = config(Backend::Pool);
        config.command_line = Some("svelteesp32 -s dist".to_string());
        let source = emit(&bundle(), &config, Some("2024-01-01T00:00:00Z")).unwrap();

        assert!(source.starts_with("// @generated by svelteesp32-pack"));
        assert!(source.contains("// engine:   pool\n"));
        assert!(source.contains("// cmdline:  svelteesp32 -s dist\n"));
        assert!(source.contains("// created:  2024-01-01T00:00:00Z\n"));

        let without = emit(&bundle(), &config, None).unwrap();
        assert!(!without.contains("created:"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let first = emit(&bundle(), &config(Backend::Async), None).unwrap();
        let second = emit(&bundle(), &config(Backend::Async), None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_contract_violations() {
        let mut assets = bundle();
        assets[1].path = assets[0].path.clone();
        assert!(matches!(
            emit(&assets, &config(Backend::Async), None),
            Err(EmitError::Contract(_))
        ));

        let mut assets = bundle();
        assets[0].gzip = Some(vec![0; 64]);
        assert!(matches!(
            emit(&assets, &config(Backend::Async), None),
            Err(EmitError::Contract(_))
        ));

        let mut assets = bundle();
        assets[0].entry = true;
        assert!(matches!(
            emit(&assets, &config(Backend::Async), None),
            Err(EmitError::Contract(_))
        ));
    }

    #[test]
    fn test_write_bytes_wraps_lines() {
        let mut out = String::new();
        write_bytes(&mut out, "DATA_X", &[0xab; 17]).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "const DATA_X: &[u8] = &[");
        assert_eq!(lines[1].matches("0xab").count(), 16);
        assert_eq!(lines[2], "    0xab,");
        assert_eq!(lines[3], "];");

        let mut out = String::new();
        write_bytes(&mut out, "DATA_EMPTY", &[]).unwrap();
        assert_eq!(out, "const DATA_EMPTY: &[u8] = &[];\n");
    }
}
