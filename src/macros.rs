//===========================================================================//

macro_rules! malformed {
    ($e:expr) => {
        return Err($crate::error::Error::MalformedHeader(
            ($e).to_string(),
        ))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::Error::MalformedHeader(
            format!($fmt, $($arg)+),
        ))
    };
}

macro_rules! unsupported {
    ($e:expr) => {
        return Err($crate::error::Error::UnsupportedImageFormat(
            ($e).to_string(),
        ))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::Error::UnsupportedImageFormat(
            format!($fmt, $($arg)+),
        ))
    };
}

//===========================================================================//
