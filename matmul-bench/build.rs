fn main() {
    use build_script_cfg::Cfg;
    use find_cuda_helper::find_cuda_root;

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/kernels/matmul.cu");

    let cuda = Cfg::new("detected_cuda");
    if find_cuda_root().is_some() {
        cuda.define();
    };
}
