use core::fmt;

macro_rules! define_errors {
    ($($name:ident = $value:literal => $msg:expr),* $(,)?) => {
        /// Numeric error codes. The image builder exits with these.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum ErrorCode {
            $($name = $value,)*
        }

        impl ErrorCode {
            /// The one-line diagnostic shown to the user.
            pub const fn message(self) -> &'static str {
                match self {
                    $(ErrorCode::$name => $msg,)*
                }
            }
        }
    };
}

define_errors!(
    NotDivisible = -1 => "Total size is not divisible by sector size",
    WordSize = -2 => "Word size must be either 16 or 32",
    LongName = -3 => "File name is too long",
    NoSpace = -4 => "No space left on disk",
    FileIo = -5 => "File I/O error",
    ImageSize = -6 => "Image size is out of range",
);

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
