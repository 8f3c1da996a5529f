/// `lastKnownFileType` Xcode records for a file extension.
pub fn last_known_file_type(ext: Option<&str>) -> &'static str {
    match ext.map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("swift") => "sourcecode.swift",
        Some("m") => "sourcecode.c.objc",
        Some("mm") => "sourcecode.cpp.objcpp",
        Some("c") => "sourcecode.c.c",
        Some("h") => "sourcecode.c.h",
        Some("cpp" | "cc" | "cxx") => "sourcecode.cpp.cpp",
        Some("hpp") => "sourcecode.cpp.h",
        Some("metal") => "sourcecode.metal",
        Some("json") => "text.json",
        Some("plist") => "text.plist.xml",
        Some("strings") => "text.plist.strings",
        Some("storyboard") => "file.storyboard",
        Some("xib") => "file.xib",
        _ => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::last_known_file_type;

    #[test]
    fn maps_common_extensions() {
        assert_eq!(last_known_file_type(Some("swift")), "sourcecode.swift");
        assert_eq!(last_known_file_type(Some("M")), "sourcecode.c.objc");
        assert_eq!(last_known_file_type(Some("zzz")), "text");
        assert_eq!(last_known_file_type(None), "text");
    }
}
