//! Embedded asset table.
//!
//! The table is produced at build time by `svelteesp32-pack` and lives in
//! read-only program memory. Everything here is `'static` and immutable, so
//! request handlers on any thread or task may read it without locking.

/// Stored representation of an asset body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Bytes are stored exactly as found in the source tree.
    Identity,
    /// Bytes are stored gzip-compressed.
    Gzip,
}

impl Encoding {
    /// Value for the `Content-Encoding` response header, if any.
    pub const fn content_encoding(self) -> Option<&'static str> {
        match self {
            Encoding::Identity => None,
            Encoding::Gzip => Some("gzip"),
        }
    }
}

/// One static file served by the embedded server.
#[derive(Debug, PartialEq, Eq)]
pub struct Asset {
    /// Served URL path, always starting with `/`.
    pub path: &'static str,
    /// Value of the `Content-Type` header.
    pub mime: &'static str,
    /// How `data` is encoded.
    pub encoding: Encoding,
    /// Length of the file before compression.
    pub original_len: usize,
    /// Quoted validator token (ETag). `None` when ETags are disabled.
    pub etag: Option<&'static str>,
    /// True for the SPA entry document.
    pub entry: bool,
    /// Stored bytes, sent as the response body.
    pub data: &'static [u8],
}

impl Asset {
    /// Length of the stored representation.
    pub const fn stored_len(&self) -> usize {
        self.data.len()
    }

    /// Whether the stored bytes are compressed.
    pub const fn is_compressed(&self) -> bool {
        matches!(self.encoding, Encoding::Gzip)
    }
}

/// Build-time serving options baked into the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeOptions {
    /// Path the entry document is additionally served at (`/` or `<base>/`).
    pub root_path: &'static str,
    /// Value of the `Cache-Control` header, if any.
    pub cache_control: Option<&'static str>,
    /// Serve the entry document for unmatched HTML navigations.
    pub spa_fallback: bool,
}

impl ServeOptions {
    pub const fn new() -> Self {
        Self {
            root_path: "/",
            cache_control: None,
            spa_fallback: true,
        }
    }
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A path to register and the asset it serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub asset: &'static Asset,
}

/// The ordered, frozen collection of all embedded assets.
#[derive(Debug)]
pub struct AssetTable {
    assets: &'static [Asset],
    options: ServeOptions,
}

impl AssetTable {
    /// Create a table. Usable in `static` items.
    pub const fn new(assets: &'static [Asset], options: ServeOptions) -> Self {
        Self { assets, options }
    }

    /// Total number of assets.
    pub const fn len(&self) -> usize {
        self.assets.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub const fn options(&self) -> &ServeOptions {
        &self.options
    }

    /// All assets in table order.
    pub fn assets(&self) -> &'static [Asset] {
        self.assets
    }

    /// Look up an asset by exact served path.
    pub fn get(&self, path: &str) -> Option<&'static Asset> {
        let assets: &'static [Asset] = self.assets;
        assets.iter().find(|asset| asset.path == path)
    }

    /// The SPA entry document, if the table has one.
    pub fn entry(&self) -> Option<&'static Asset> {
        let assets: &'static [Asset] = self.assets;
        assets.iter().find(|asset| asset.entry)
    }

    /// The document served for unmatched HTML navigations.
    pub fn fallback(&self) -> Option<&'static Asset> {
        if self.options.spa_fallback {
            self.entry()
        } else {
            None
        }
    }

    /// Every exact-path route: one per asset, plus the root alias of the
    /// entry document when it differs from the entry's own path.
    pub fn routes(&self) -> impl Iterator<Item = Route> + '_ {
        let assets: &'static [Asset] = self.assets;
        let root = self.root_route();
        assets
            .iter()
            .map(|asset| Route {
                path: asset.path,
                asset,
            })
            .chain(root)
    }

    fn root_route(&self) -> Option<Route> {
        let entry = self.entry()?;
        let root_path = self.options.root_path;
        if entry.path == root_path || self.get(root_path).is_some() {
            return None;
        }
        Some(Route {
            path: root_path,
            asset: entry,
        })
    }

    /// Number of exact-path routes, root alias included.
    pub fn route_count(&self) -> usize {
        self.routes().count()
    }

    /// Number of handlers a registrar with a single-handler fallback must
    /// accept to serve this table.
    pub fn handler_count(&self) -> usize {
        self.route_count() + usize::from(self.fallback().is_some())
    }

    /// Sum of original file sizes.
    pub fn total_original_len(&self) -> usize {
        self.assets.iter().map(|asset| asset.original_len).sum()
    }

    /// Sum of stored (possibly compressed) sizes.
    pub fn total_stored_len(&self) -> usize {
        self.assets.iter().map(Asset::stored_len).sum()
    }
}
