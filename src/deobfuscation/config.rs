//! Configuration for invokedynamic recovery.

/// Descriptor of the bootstrap methods this crate knows how to probe.
pub const BOOTSTRAP_DESC: &str =
    "(Ljava/lang/Object;Ljava/lang/String;Ljava/lang/invoke/MethodType;)Ljava/lang/Object;";

/// Owner of the lookup call the bootstrap ends with.
pub const LOOKUP_OWNER: &str = "java/lang/invoke/MethodHandles$Lookup";

/// Descriptor of the intercepted lookup call.
pub const LOOKUP_DESC: &str =
    "(Ljava/lang/Class;Ljava/lang/String;Ljava/lang/invoke/MethodType;)Ljava/lang/invoke/MethodHandle;";

/// Configuration for [`crate::deobfuscation::stringer::Invokedynamic2Transformer`].
///
/// The defaults match the bootstrap shape emitted by the obfuscator. Adjust
/// them only for variants that keep the same overall scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndyConfig {
    /// Bootstrap descriptor a dynamic call site must use to be probed.
    pub bootstrap_desc: String,

    /// Owner of the lookup call that is intercepted.
    pub lookup_owner: String,

    /// Descriptor of the lookup call that is intercepted.
    pub lookup_desc: String,

    /// Name prefix of synthesized probe methods (default: `Decrypt`).
    pub probe_name_prefix: String,

    /// Only intercept lookups performed directly by the class under analysis
    /// (default: true).
    pub require_caller_frame: bool,

    /// Search superclasses and superinterfaces when resolving the recovered
    /// member (default: true).
    pub search_hierarchy: bool,

    /// Scan classes for candidate sites in parallel (default: true).
    pub parallel_scan: bool,
}

impl Default for IndyConfig {
    fn default() -> Self {
        Self {
            bootstrap_desc: BOOTSTRAP_DESC.to_string(),
            lookup_owner: LOOKUP_OWNER.to_string(),
            lookup_desc: LOOKUP_DESC.to_string(),
            probe_name_prefix: "Decrypt".to_string(),
            require_caller_frame: true,
            search_hierarchy: true,
            parallel_scan: true,
        }
    }
}

impl IndyConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bootstrap descriptor that marks candidate sites.
    #[must_use]
    pub fn with_bootstrap_desc(mut self, desc: impl Into<String>) -> Self {
        self.bootstrap_desc = desc.into();
        self
    }

    /// Sets the owner and descriptor of the intercepted lookup call.
    #[must_use]
    pub fn with_lookup(mut self, owner: impl Into<String>, desc: impl Into<String>) -> Self {
        self.lookup_owner = owner.into();
        self.lookup_desc = desc.into();
        self
    }

    /// Sets the probe method name prefix.
    #[must_use]
    pub fn with_probe_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.probe_name_prefix = prefix.into();
        self
    }

    /// Enables or disables the caller frame check of the interceptor.
    #[must_use]
    pub fn with_caller_frame_check(mut self, enable: bool) -> Self {
        self.require_caller_frame = enable;
        self
    }

    /// Enables or disables hierarchy search during member resolution.
    #[must_use]
    pub fn with_hierarchy_search(mut self, enable: bool) -> Self {
        self.search_hierarchy = enable;
        self
    }

    /// Enables or disables the parallel candidate scan.
    #[must_use]
    pub fn with_parallel_scan(mut self, enable: bool) -> Self {
        self.parallel_scan = enable;
        self
    }
}
