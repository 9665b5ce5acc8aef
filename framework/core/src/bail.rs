/// Return this error from a virtual user's behaviour function to stop that virtual user.
///
/// This should be used when a VU hits a problem that makes further iterations pointless for that
/// VU but should not stop the rest of the run. For example, if the target environment rejects the
/// VU's session in a way that won't recover, the VU can bail while the other VUs keep loading the
/// service.
#[derive(derive_more::Error, derive_more::Display, Debug)]
pub struct VuBailError {
    msg: String,
}

impl Default for VuBailError {
    fn default() -> Self {
        Self {
            msg: "Virtual user is bailing".to_string(),
        }
    }
}
