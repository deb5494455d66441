pub const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;
pub const STORED_NAME_LENGTH: usize = 16;
pub const UPLOAD_FIELD_NAME: &str = "file";
pub const UPLOADS_PREFIX: &str = "/uploads/";
pub const RAW_SUFFIX: &str = "/raw";
pub const PGP_ARMOR_MARKER: &[u8] = b"-----BEGIN PGP MESSAGE-----";
pub const TEMP_UPLOAD_SUFFIX: &str = ".uploading";
pub const MIN_MAX_UPLOAD_MB: u64 = 1;
pub const MAX_MAX_UPLOAD_MB: u64 = 5 * 1024;
pub const BYTES_PER_MB: u64 = 1024 * 1024;
pub const NAME_ALPHABET: [char; 62] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L',
    'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4',
    '5', '6', '7', '8', '9',
];
