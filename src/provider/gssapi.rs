//! System security provider backed by the host GSS-API libraries.
//!
//! Provider-owned resources (names, credentials, client contexts) live in a
//! handle table keyed by the opaque ids handed to the negotiation engine.
//! Thread safety of the underlying library is not assumed; callers serialize
//! through the global provider lock as everywhere else.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use libgssapi::context::{ClientCtx, CtxFlags, SecurityContext};
use libgssapi::credential::{Cred, CredUsage};
use libgssapi::error::Error as GssError;
use libgssapi::name::Name;

use super::{
    ContextFlags, CredHandle, CtxHandle, GssStatus, InitiateRequest, NameHandle, SecurityProvider,
    StatusKind, StepOutcome,
};

const GSS_S_BAD_NAME: u32 = 2 << 16;
const GSS_S_NO_CONTEXT: u32 = 8 << 16;

enum Resource {
    Name(Name),
    Credential(Cred),
    Context(ClientCtx),
}

/// GSS-API-backed [`SecurityProvider`].
pub struct GssapiProvider {
    resources: Mutex<HashMap<u64, Resource>>,
    next_handle: AtomicU64,
}

impl GssapiProvider {
    pub fn new() -> Self {
        Self {
            resources: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    fn insert(&self, resource: Resource) -> u64 {
        let id = self.next_handle.fetch_add(1, Ordering::SeqCst);
        self.resources.lock().unwrap().insert(id, resource);
        id
    }

    fn take(&self, id: u64) -> Option<Resource> {
        self.resources.lock().unwrap().remove(&id)
    }

    fn name(&self, handle: &NameHandle) -> Option<Name> {
        match self.resources.lock().unwrap().get(&handle.0) {
            Some(Resource::Name(name)) => Some(name.clone()),
            _ => None,
        }
    }

    fn credential(&self, handle: &CredHandle) -> Option<Cred> {
        match self.resources.lock().unwrap().get(&handle.0) {
            Some(Resource::Credential(credential)) => Some(credential.clone()),
            _ => None,
        }
    }
}

impl Default for GssapiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityProvider for GssapiProvider {
    fn import_name(&self, name: &str) -> Result<NameHandle, GssStatus> {
        let imported = Name::new(name.as_bytes(), None).map_err(status_of)?;
        Ok(NameHandle(self.insert(Resource::Name(imported))))
    }

    fn acquire_initiate_credential(
        &self,
        initiator: &NameHandle,
    ) -> Result<CredHandle, GssStatus> {
        let name = self.name(initiator).ok_or(GssStatus {
            major: GSS_S_BAD_NAME,
            minor: 0,
        })?;
        let credential =
            Cred::acquire(Some(&name), None, CredUsage::Initiate, None).map_err(status_of)?;
        Ok(CredHandle(self.insert(Resource::Credential(credential))))
    }

    fn initiate_context(
        &self,
        request: InitiateRequest<'_>,
    ) -> Result<StepOutcome, GssStatus> {
        let mut context = match request.context {
            Some(handle) => match self.take(handle.0) {
                Some(Resource::Context(context)) => context,
                _ => {
                    return Err(GssStatus {
                        major: GSS_S_NO_CONTEXT,
                        minor: 0,
                    })
                }
            },
            None => {
                let target = request
                    .target
                    .and_then(|handle| self.name(handle))
                    .ok_or(GssStatus {
                        major: GSS_S_BAD_NAME,
                        minor: 0,
                    })?;
                let credential = match request.credential {
                    Some(handle) => Some(self.credential(handle).ok_or(GssStatus {
                        major: GSS_S_BAD_NAME,
                        minor: 0,
                    })?),
                    None => None,
                };
                ClientCtx::new(
                    credential,
                    target,
                    CtxFlags::from_bits_truncate(request.flags.bits()),
                    None,
                )
            }
        };

        let input = if request.input_token.is_empty() {
            None
        } else {
            Some(request.input_token)
        };

        // On step failure the context is dropped here, releasing it; the
        // caller's handle slot is already empty.
        let output = context.step(input, None).map_err(status_of)?;
        let token = output.map(|buf| buf.to_vec()).unwrap_or_default();

        if context.is_complete() {
            let info = context.info().map_err(status_of)?;
            let mechanism = oid_to_dotted(&info.mechanism);
            let flags = ContextFlags::from_bits(info.flags.bits());
            let initiator = NameHandle(self.insert(Resource::Name(info.source_name)));
            let handle = CtxHandle(self.insert(Resource::Context(context)));

            Ok(StepOutcome::Complete {
                context: handle,
                mechanism,
                initiator,
                token,
                flags,
            })
        } else {
            let handle = CtxHandle(self.insert(Resource::Context(context)));
            Ok(StepOutcome::ContinueNeeded {
                context: handle,
                token,
            })
        }
    }

    fn display_name(&self, name: &NameHandle) -> Result<String, GssStatus> {
        let name = self.name(name).ok_or(GssStatus {
            major: GSS_S_BAD_NAME,
            minor: 0,
        })?;
        Ok(name.to_string())
    }

    fn status_message(
        &self,
        code: u32,
        kind: StatusKind,
        mechanism: Option<&str>,
        message_context: &mut u32,
    ) -> String {
        display_status(code, kind, mechanism, message_context)
    }

    fn release_name(&self, name: NameHandle) {
        self.take(name.0);
    }

    fn release_credential(&self, credential: CredHandle) {
        self.take(credential.0);
    }

    fn delete_context(&self, context: CtxHandle) {
        self.take(context.0);
    }
}

fn status_of(error: GssError) -> GssStatus {
    GssStatus {
        major: error.major.bits(),
        minor: error.minor,
    }
}

/// Render one chained message for a status code via `gss_display_status`.
fn display_status(
    code: u32,
    kind: StatusKind,
    mechanism: Option<&str>,
    message_context: &mut u32,
) -> String {
    use libgssapi_sys::{
        gss_buffer_desc_struct, gss_buffer_t, gss_display_status, gss_release_buffer,
        gss_OID_desc, OM_uint32, GSS_C_GSS_CODE, GSS_C_MECH_CODE, GSS_S_COMPLETE,
    };

    let status_type = match kind {
        StatusKind::Gss => GSS_C_GSS_CODE as i32,
        StatusKind::Mech => GSS_C_MECH_CODE as i32,
    };

    // Kept alive until after the call; the descriptor points into it.
    let mech_oid = mechanism.and_then(str_to_oid);
    let mech_ptr = mech_oid
        .as_ref()
        .map(OwnedOid::as_ptr)
        .unwrap_or(std::ptr::null_mut::<gss_OID_desc>());

    let mut minor: OM_uint32 = 0;
    let mut buf = gss_buffer_desc_struct {
        length: 0,
        value: std::ptr::null_mut(),
    };

    let major = unsafe {
        gss_display_status(
            &mut minor as *mut OM_uint32,
            code,
            status_type,
            mech_ptr,
            message_context as *mut OM_uint32,
            &mut buf as gss_buffer_t,
        )
    };

    if major != GSS_S_COMPLETE {
        *message_context = 0;
        return String::new();
    }

    let message = if buf.length > 0 && !buf.value.is_null() {
        let bytes = unsafe {
            std::slice::from_raw_parts(buf.value.cast::<u8>(), buf.length as usize)
        };
        String::from_utf8_lossy(bytes)
            .trim_end_matches('\0')
            .to_string()
    } else {
        String::new()
    };

    let mut release_minor: OM_uint32 = 0;
    unsafe {
        gss_release_buffer(&mut release_minor as *mut OM_uint32, &mut buf as gss_buffer_t);
    }

    message
}

/// Owned DER encoding of a mechanism OID, kept alive for the FFI call.
struct OwnedOid {
    _der: Box<[u8]>,
    desc: libgssapi_sys::gss_OID_desc,
}

impl OwnedOid {
    fn as_ptr(&self) -> *mut libgssapi_sys::gss_OID_desc {
        &self.desc as *const _ as *mut _
    }
}

/// Encode a dotted-decimal OID string into its DER form.
fn str_to_oid(text: &str) -> Option<OwnedOid> {
    let arcs = super::parse_oid_arcs(text)?;
    if arcs.len() < 2 || arcs[0] > 2 || (arcs[0] < 2 && arcs[1] >= 40) {
        return None;
    }

    let mut der: Vec<u8> = Vec::new();
    encode_base128(&mut der, arcs[0] * 40 + arcs[1]);
    for arc in &arcs[2..] {
        encode_base128(&mut der, *arc);
    }

    let mut der = der.into_boxed_slice();
    let desc = libgssapi_sys::gss_OID_desc {
        length: der.len() as u32,
        elements: der.as_mut_ptr().cast(),
    };
    Some(OwnedOid { _der: der, desc })
}

fn encode_base128(out: &mut Vec<u8>, value: u64) {
    let mut chunks = [0u8; 10];
    let mut count = 0;
    let mut rest = value;
    loop {
        chunks[count] = (rest & 0x7f) as u8;
        rest >>= 7;
        count += 1;
        if rest == 0 {
            break;
        }
    }
    for index in (0..count).rev() {
        let mut byte = chunks[index];
        if index != 0 {
            byte |= 0x80;
        }
        out.push(byte);
    }
}

/// Decode a DER-encoded OID into dotted-decimal notation.
fn oid_to_dotted(der: &[u8]) -> String {
    let mut arcs: Vec<u64> = Vec::new();
    let mut current: u64 = 0;

    for byte in der {
        current = (current << 7) | u64::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            if arcs.is_empty() {
                let first = if current < 40 {
                    0
                } else if current < 80 {
                    1
                } else {
                    2
                };
                arcs.push(first);
                arcs.push(current - first * 40);
            } else {
                arcs.push(current);
            }
            current = 0;
        }
    }

    arcs.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oid_der_roundtrip() {
        // 1.2.840.113554.1.2.2 (krb5)
        let der: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x12, 0x01, 0x02, 0x02];
        assert_eq!(oid_to_dotted(der), "1.2.840.113554.1.2.2");

        let owned = str_to_oid("1.2.840.113554.1.2.2").expect("encodes");
        assert_eq!(&*owned._der, der);
    }

    #[test]
    fn test_str_to_oid_rejects_garbage() {
        assert!(str_to_oid("not-an-oid").is_none());
        assert!(str_to_oid("3.1.2").is_none());
    }
}
