pub mod compile_time {
    pub mod file_processing {
        /// Maximum schema file size accepted for processing (10MB)
        pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

        /// Threshold for considering a schema file "large" (1MB)
        pub const LARGE_FILE_THRESHOLD: u64 = 1024 * 1024;

        /// Maximum line count accepted for a single schema file
        pub const MAX_LINE_COUNT: usize = 100_000;

        /// Extension expected on schema files
        pub const SADL_EXTENSION: &str = "sadl";
    }

    pub mod lexical {
        /// Maximum string literal or textblock size (1MB)
        pub const MAX_STRING_SIZE: usize = 1_048_576;

        /// Maximum identifier length (255 characters)
        pub const MAX_IDENTIFIER_LENGTH: usize = 255;

        /// Maximum line or block comment length
        pub const MAX_COMMENT_LENGTH: usize = 10_000;

        /// Maximum number of tokens allowed in a single file
        pub const MAX_TOKEN_COUNT: usize = 1_000_000;
    }

    pub mod syntax {
        /// Maximum nesting of inline Struct/Enum definitions and literal values
        pub const MAX_PARSE_DEPTH: usize = 64;

        /// Lines of source shown above the offending token in syntax errors
        pub const ERROR_CONTEXT_LINES: u32 = 5;

        /// Tokens the stream remembers for pushback
        pub const MAX_PUSHBACK_TOKENS: usize = 2;
    }

    pub mod validation {
        /// Compiled size limit for `pattern` regular expressions (bytes)
        pub const MAX_PATTERN_REGEX_SIZE: usize = 1 << 20;
    }

    pub mod batch_processing {
        /// Maximum number of worker threads for file processing
        pub const MAX_WORKER_THREADS: usize = 8;

        /// Maximum files per batch
        pub const MAX_FILES_PER_BATCH: usize = 1000;
    }

    pub mod logging {
        /// Log buffer size for the in-memory logger
        pub const LOG_BUFFER_SIZE: usize = 10_000;

        /// Maximum log events kept per file before truncation
        pub const MAX_LOG_EVENTS_PER_FILE: usize = 1_000;

        /// Maximum log message length
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 10_000;
    }
}
