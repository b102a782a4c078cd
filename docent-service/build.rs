fn main() {
    // PDFium is loaded at runtime from the configured `pdf.pdfium_dir`,
    // the current directory, vendor/pdfium/lib/, or the system library path.
    println!("cargo:rerun-if-changed=build.rs");
}
