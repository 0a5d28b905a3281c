use colored::*;

use sondr_core::fingerprint;

use crate::terminal::print;

pub fn classify(descr: &str) {
    let fp = fingerprint::classify(descr);

    print::tree_head(0, descr);
    print::as_tree_one_level(vec![
        ("Vendor".into(), fp.vendor.cyan()),
        ("Model".into(), fp.model.normal()),
        ("Type".into(), fp.device_type.normal()),
        (
            "Firmware".into(),
            fp.firmware.as_deref().unwrap_or("unknown").normal(),
        ),
    ]);
}
