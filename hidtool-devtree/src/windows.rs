//! SetupAPI / CfgMgr32 backend
//!
//! Device interfaces come from `SetupDiGetClassDevsW`; everything node related
//! (parent, ids, properties, status, enable/disable) goes through the
//! configuration manager so a node handle is just a `DEVINST`.

use std::ffi::c_void;
use std::mem;
use std::ptr;

use tracing::debug;
use windows_sys::core::GUID;
use windows_sys::Win32::Devices::DeviceAndDriverInstallation::{
    CM_Disable_DevNode, CM_Enable_DevNode, CM_Get_DevNode_Registry_PropertyW,
    CM_Get_DevNode_Status, CM_Get_Device_IDW, CM_Get_Device_ID_Size, CM_Get_Parent,
    CM_Locate_DevNodeW, SetupDiDestroyDeviceInfoList, SetupDiEnumDeviceInterfaces,
    SetupDiGetClassDevsW, SetupDiGetDeviceInterfaceDetailW, CM_DRP_DEVICEDESC, CM_DRP_MFG,
    CM_LOCATE_DEVNODE_NORMAL, CR_BUFFER_SMALL, CR_SUCCESS, DIGCF_DEVICEINTERFACE, DIGCF_PRESENT,
    DN_DISABLEABLE, DN_STARTED, HDEVINFO, SP_DEVICE_INTERFACE_DATA,
    SP_DEVICE_INTERFACE_DETAIL_DATA_W, SP_DEVINFO_DATA,
};
use windows_sys::Win32::Foundation::{GetLastError, ERROR_INSUFFICIENT_BUFFER, INVALID_HANDLE_VALUE};
use windows_sys::Win32::Globalization::CP_UTF8;
use windows_sys::Win32::System::Console::SetConsoleOutputCP;

use crate::error::{DeviceError, FetchError};
use crate::types::{Fetched, InterfaceClass, NodeStatus, PropertyKind, RunState, Transition};
use crate::DeviceDirectory;

/// Switch console output to UTF-8. Call once at process start.
pub fn init_console_utf8() {
    // SAFETY: no pointers involved; failure leaves the code page unchanged.
    if unsafe { SetConsoleOutputCP(CP_UTF8) } == 0 {
        debug!("SetConsoleOutputCP failed: {}", unsafe { GetLastError() });
    }
}

fn to_guid(class: &InterfaceClass) -> GUID {
    GUID::from_u128(class.guid)
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Device information set holding present interfaces of one class
pub struct DevInfoSet {
    handle: HDEVINFO,
    class: GUID,
}

/// `SP_DEVICE_INTERFACE_DATA` for one enumerated interface
#[derive(Clone, Copy)]
pub struct InterfaceData(SP_DEVICE_INTERFACE_DATA);

/// SetupAPI / CfgMgr32 device directory
#[derive(Debug, Default)]
pub struct WindowsDirectory;

impl WindowsDirectory {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceDirectory for WindowsDirectory {
    type Snapshot = DevInfoSet;
    type Interface = InterfaceData;
    type Node = u32;

    fn acquire_snapshot(&self, class: &InterfaceClass) -> Result<DevInfoSet, DeviceError> {
        let guid = to_guid(class);
        // SAFETY: guid outlives the call; null enumerator and window are allowed.
        let handle = unsafe {
            SetupDiGetClassDevsW(
                &guid,
                ptr::null(),
                ptr::null_mut(),
                DIGCF_PRESENT | DIGCF_DEVICEINTERFACE,
            )
        };
        if handle == INVALID_HANDLE_VALUE as HDEVINFO {
            return Err(DeviceError::EnumerationUnavailable(unsafe { GetLastError() }));
        }
        Ok(DevInfoSet {
            handle,
            class: guid,
        })
    }

    fn enumerate_interface(&self, snapshot: &DevInfoSet, index: u32) -> Option<InterfaceData> {
        // SAFETY: all-zero is a valid SP_DEVICE_INTERFACE_DATA; cbSize set below.
        let mut data: SP_DEVICE_INTERFACE_DATA = unsafe { mem::zeroed() };
        data.cbSize = mem::size_of::<SP_DEVICE_INTERFACE_DATA>() as u32;
        // SAFETY: handle is a live device info set and data is sized.
        let ok = unsafe {
            SetupDiEnumDeviceInterfaces(
                snapshot.handle,
                ptr::null(),
                &snapshot.class,
                index,
                &mut data,
            )
        };
        (ok != 0).then_some(InterfaceData(data))
    }

    fn interface_detail(
        &self,
        snapshot: &DevInfoSet,
        interface: &InterfaceData,
        buf: &mut [u8],
    ) -> Result<Fetched<u32>, FetchError> {
        if buf.is_empty() {
            let mut required = 0u32;
            // SAFETY: size query with no output buffer.
            let ok = unsafe {
                SetupDiGetDeviceInterfaceDetailW(
                    snapshot.handle,
                    &interface.0,
                    ptr::null_mut(),
                    0,
                    &mut required,
                    ptr::null_mut(),
                )
            };
            if ok != 0 {
                return Err(FetchError::NoSizeReported);
            }
            let err = unsafe { GetLastError() };
            return if err == ERROR_INSUFFICIENT_BUFFER {
                Err(FetchError::BufferTooSmall {
                    required: required as usize,
                })
            } else {
                Err(FetchError::Failed(err))
            };
        }

        let size = buf.len();
        if size < mem::size_of::<SP_DEVICE_INTERFACE_DETAIL_DATA_W>() {
            return Err(FetchError::BufferTooSmall {
                required: mem::size_of::<SP_DEVICE_INTERFACE_DETAIL_DATA_W>(),
            });
        }
        // The detail struct needs u32 alignment, which a byte buffer doesn't promise
        let mut scratch = vec![0u32; size.div_ceil(4)];
        let detail = scratch.as_mut_ptr() as *mut SP_DEVICE_INTERFACE_DETAIL_DATA_W;
        // SAFETY: scratch is at least `size` bytes, aligned, and holds the header.
        unsafe {
            (*detail).cbSize = mem::size_of::<SP_DEVICE_INTERFACE_DETAIL_DATA_W>() as u32;
        }
        // SAFETY: all-zero is a valid SP_DEVINFO_DATA; cbSize set below.
        let mut devinfo: SP_DEVINFO_DATA = unsafe { mem::zeroed() };
        devinfo.cbSize = mem::size_of::<SP_DEVINFO_DATA>() as u32;

        // SAFETY: detail points at `size` writable bytes with cbSize set.
        let ok = unsafe {
            SetupDiGetDeviceInterfaceDetailW(
                snapshot.handle,
                &interface.0,
                detail,
                size as u32,
                ptr::null_mut(),
                &mut devinfo,
            )
        };
        if ok == 0 {
            return Err(FetchError::Failed(unsafe { GetLastError() }));
        }

        // SAFETY: scratch owns at least `size` initialized bytes.
        let bytes = unsafe { std::slice::from_raw_parts(scratch.as_ptr() as *const u8, size) };
        let path = &bytes[mem::offset_of!(SP_DEVICE_INTERFACE_DETAIL_DATA_W, DevicePath)..];
        let len = path
            .chunks_exact(2)
            .position(|pair| pair == [0u8, 0])
            .map_or(path.len() & !1, |units| units * 2);
        buf[..len].copy_from_slice(&path[..len]);
        Ok(Fetched {
            len,
            value: devinfo.DevInst,
        })
    }

    fn locate_node(&self, instance_id: &str) -> Result<u32, DeviceError> {
        let wide = to_wide(instance_id);
        let mut devinst = 0u32;
        // SAFETY: wide is NUL terminated and outlives the call.
        let cr =
            unsafe { CM_Locate_DevNodeW(&mut devinst, wide.as_ptr(), CM_LOCATE_DEVNODE_NORMAL) };
        if cr != CR_SUCCESS {
            debug!("CM_Locate_DevNodeW({}) -> {:#x}", instance_id, cr);
            return Err(DeviceError::NodeNotFound(instance_id.to_string()));
        }
        Ok(devinst)
    }

    fn parent(&self, node: u32) -> Result<u32, DeviceError> {
        let mut parent = 0u32;
        // SAFETY: plain out-parameter.
        let cr = unsafe { CM_Get_Parent(&mut parent, node, 0) };
        if cr != CR_SUCCESS {
            debug!("CM_Get_Parent({}) -> {:#x}", node, cr);
            return Err(DeviceError::NoParent);
        }
        Ok(parent)
    }

    fn device_id(&self, node: u32, buf: &mut [u16]) -> Result<Fetched, FetchError> {
        // SAFETY: buf is writable for buf.len() units.
        let cr = unsafe { CM_Get_Device_IDW(node, buf.as_mut_ptr(), buf.len() as u32, 0) };
        match cr {
            CR_SUCCESS => Ok(Fetched::units(
                buf.iter().position(|&u| u == 0).unwrap_or(buf.len()),
            )),
            CR_BUFFER_SMALL => {
                let mut len = 0u32;
                // SAFETY: plain out-parameter.
                unsafe { CM_Get_Device_ID_Size(&mut len, node, 0) };
                Err(FetchError::BufferTooSmall {
                    required: len as usize + 1,
                })
            }
            cr => Err(FetchError::Failed(cr)),
        }
    }

    fn string_property(
        &self,
        node: u32,
        kind: PropertyKind,
        buf: &mut [u16],
    ) -> Result<Fetched, FetchError> {
        let property = match kind {
            PropertyKind::Manufacturer => CM_DRP_MFG,
            PropertyKind::Description => CM_DRP_DEVICEDESC,
        };
        let mut bytes = (buf.len() * 2) as u32;
        // SAFETY: buf is writable for `bytes` bytes.
        let cr = unsafe {
            CM_Get_DevNode_Registry_PropertyW(
                node,
                property,
                ptr::null_mut(),
                buf.as_mut_ptr() as *mut c_void,
                &mut bytes,
                0,
            )
        };
        match cr {
            CR_SUCCESS => {
                let units = (bytes as usize / 2).min(buf.len());
                Ok(Fetched::units(
                    buf[..units].iter().position(|&u| u == 0).unwrap_or(units),
                ))
            }
            CR_BUFFER_SMALL => Err(FetchError::BufferTooSmall {
                required: bytes as usize / 2,
            }),
            cr => Err(FetchError::Failed(cr)),
        }
    }

    fn status(&self, node: u32) -> Result<NodeStatus, DeviceError> {
        let mut status = 0u32;
        let mut problem = 0u32;
        // SAFETY: plain out-parameters.
        let cr = unsafe { CM_Get_DevNode_Status(&mut status, &mut problem, node, 0) };
        if cr != CR_SUCCESS {
            debug!("CM_Get_DevNode_Status({}) -> {:#x}", node, cr);
            return Err(DeviceError::StatusUnavailable);
        }
        Ok(NodeStatus {
            run_state: if status & DN_STARTED != 0 {
                RunState::Started
            } else {
                RunState::Disabled
            },
            disableable: status & DN_DISABLEABLE != 0,
            problem,
        })
    }

    fn enable(&self, node: u32) -> Result<(), DeviceError> {
        // SAFETY: node is a devinst from the configuration manager.
        match unsafe { CM_Enable_DevNode(node, 0) } {
            CR_SUCCESS => Ok(()),
            code => Err(DeviceError::ToggleFailed {
                transition: Transition::Enable,
                code,
            }),
        }
    }

    fn disable(&self, node: u32) -> Result<(), DeviceError> {
        // SAFETY: node is a devinst from the configuration manager.
        match unsafe { CM_Disable_DevNode(node, 0) } {
            CR_SUCCESS => Ok(()),
            code => Err(DeviceError::ToggleFailed {
                transition: Transition::Disable,
                code,
            }),
        }
    }

    fn release_snapshot(&self, snapshot: &DevInfoSet) {
        // SAFETY: handle came from SetupDiGetClassDevsW and is released once.
        if unsafe { SetupDiDestroyDeviceInfoList(snapshot.handle) } == 0 {
            debug!("SetupDiDestroyDeviceInfoList failed: {}", unsafe {
                GetLastError()
            });
        }
    }
}
