mod import;
mod lifecycle;
mod util;
